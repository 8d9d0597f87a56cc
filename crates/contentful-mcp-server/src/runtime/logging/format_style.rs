use serde::Deserialize;

#[derive(Debug, Default, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// Log output format style. Maps to a format from tracing-subscriber.
pub enum FormatStyle {
    #[default]
    /// Human-readable, single-line logs
    Full,
    /// Like `Full`, optimized for short line lengths
    Compact,
    /// Newline-delimited json logs
    Json,
    /// Multi-line logs including the source location
    Pretty,
}
