//! Column names of the "Base Refinada" sheet.
//! The names are an external contract, so they are kept exactly as they appear in the workbook.

/// Sheet read by default.
pub const DEFAULT_SHEET: &str = "Base Refinada";

pub const PLANTA: &str = "PLANTA";
pub const BASE: &str = "base";
pub const EQUIPMENT: &str = "equipment";
pub const TIPO_SENSOR: &str = "TIPO_SENSOR";
pub const EVENT_TYPE: &str = "event_type";
pub const TIME: &str = "time";
pub const DATA_ABERTURA: &str = "DATA ABERTURA";
pub const DATA_EXECUCAO: &str = "DATA EXECUÇÃO";

/// Derived year-month label of `DATA ABERTURA`.
pub const MES_ANO: &str = "mes_ano";

/// Columns coerced to timestamps.
pub const DATETIME_COLUMNS: [&str; 3] = [DATA_ABERTURA, TIME, DATA_EXECUCAO];

/// Key tuple used to drop repeated events.
pub const KEY_COLUMNS: [&str; 6] = [PLANTA, BASE, EQUIPMENT, TIPO_SENSOR, EVENT_TYPE, TIME];

/// Every column the sheet must carry.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    PLANTA,
    BASE,
    EQUIPMENT,
    TIPO_SENSOR,
    EVENT_TYPE,
    TIME,
    DATA_ABERTURA,
    DATA_EXECUCAO,
];

/// File extensions listed as candidates when a source is missing.
pub const DATA_EXTENSIONS: [&str; 6] = ["xlsx", "xlsm", "xlsb", "xls", "ods", "csv"];
