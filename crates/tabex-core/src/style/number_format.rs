//! Built-in number format table
//!
//! Writers look format codes up here before registering a custom format, so a
//! code such as `0.00` resolves to its built-in id instead of a new entry.

/// Id of the first custom number format
pub const FIRST_CUSTOM_FORMAT_ID: u32 = 164;

/// Format code used for date values that carry no explicit format
pub const DEFAULT_DATE_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

const BUILTIN_FORMATS: &[(u32, &str)] = &[
    (0, "General"),
    (1, "0"),
    (2, "0.00"),
    (3, "#,##0"),
    (4, "#,##0.00"),
    (9, "0%"),
    (10, "0.00%"),
    (11, "0.00E+00"),
    (12, "# ?/?"),
    (13, "# ??/??"),
    (14, "mm-dd-yy"),
    (15, "d-mmm-yy"),
    (16, "d-mmm"),
    (17, "mmm-yy"),
    (18, "h:mm AM/PM"),
    (19, "h:mm:ss AM/PM"),
    (20, "h:mm"),
    (21, "h:mm:ss"),
    (22, "m/d/yy h:mm"),
    (37, "#,##0 ;(#,##0)"),
    (38, "#,##0 ;[Red](#,##0)"),
    (39, "#,##0.00;(#,##0.00)"),
    (40, "#,##0.00;[Red](#,##0.00)"),
    (49, "@"),
];

/// Look up the built-in id for a format code
pub fn builtin_format_id(code: &str) -> Option<u32> {
    BUILTIN_FORMATS
        .iter()
        .find(|(_, c)| c.eq_ignore_ascii_case(code))
        .map(|(id, _)| *id)
}

/// Get the built-in format code for an id
pub fn builtin_format_code(id: u32) -> Option<&'static str> {
    BUILTIN_FORMATS
        .iter()
        .find(|(i, _)| *i == id)
        .map(|(_, code)| *code)
}

/// Check if a format code displays a date or time
pub fn is_date_format(code: &str) -> bool {
    if let Some(id) = builtin_format_id(code) {
        return (14..=22).contains(&id);
    }
    // Ignore quoted literals and bracketed sections such as [Red]
    let mut in_quotes = false;
    let mut in_brackets = false;
    for c in code.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            '[' if !in_quotes => in_brackets = true,
            ']' if !in_quotes => in_brackets = false,
            'y' | 'Y' | 'm' | 'M' | 'd' | 'D' | 'h' | 'H' | 's' | 'S'
                if !in_quotes && !in_brackets =>
            {
                return true
            }
            _ => {}
        }
    }
    false
}
