/// Format a value for compact human-readable output.
pub trait FormatValue {
    fn format_value(&self) -> String;
}

impl FormatValue for f32 {
    fn format_value(&self) -> String {
        format!("{:.2}", self)
    }
}

/// Format a slice with head/tail truncation.
pub fn format_truncated<T: FormatValue>(data: &[T]) -> String {
    let len = data.len();
    if len == 0 {
        return "{}".to_string();
    }
    if len <= 4 {
        let joined = data
            .iter()
            .map(FormatValue::format_value)
            .collect::<Vec<_>>()
            .join(", ");
        return format!("{{{}}}", joined);
    }
    let head = &data[..2];
    let tail = &data[len - 2..];
    format!(
        "{{{}, {} ... {}, {}}}",
        head[0].format_value(),
        head[1].format_value(),
        tail[0].format_value(),
        tail[1].format_value()
    )
}

/// Render a nanosecond duration as `Xms Yus Zns` plus its parts.
pub fn format_duration_ns(ns: u128) -> (String, [u64; 3]) {
    let ms = (ns / 1_000_000) as u64;
    let rem_ms = (ns % 1_000_000) as u64;
    let us = rem_ms / 1_000;
    let ns = rem_ms % 1_000;
    (format!("{}ms {}us {}ns", ms, us, ns), [ms, us, ns])
}
