//! `%(field)s`-style record formatting.

use log::Level;

/// A parsed record format. Supported fields: `asctime`, `name`,
/// `levelname`, `message`. Unknown fields render empty.
#[derive(Debug, Clone)]
pub(crate) struct RecordFormatter {
    segments: Vec<Segment>,
}

#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Asctime,
    Name,
    Levelname,
    Message,
    Unknown,
}

impl RecordFormatter {
    /// Parse a `%(field)s` pattern into renderable segments.
    pub(crate) fn parse(pattern: &str) -> Self {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = pattern.chars().peekable();

        while let Some(ch) = chars.next() {
            if ch != '%' {
                literal.push(ch);
                continue;
            }
            match chars.peek() {
                Some('%') => {
                    chars.next();
                    literal.push('%');
                }
                Some('(') => {
                    chars.next();
                    let mut field = String::new();
                    for ch in chars.by_ref() {
                        if ch == ')' {
                            break;
                        }
                        field.push(ch);
                    }
                    // Skip the conversion character ("s", "d", ...).
                    chars.next();
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(match field.as_str() {
                        "asctime" => Segment::Asctime,
                        "name" => Segment::Name,
                        "levelname" => Segment::Levelname,
                        "message" => Segment::Message,
                        _ => Segment::Unknown,
                    });
                }
                _ => literal.push('%'),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Self { segments }
    }

    /// A formatter that renders the bare message.
    pub(crate) fn message_only() -> Self {
        Self {
            segments: vec![Segment::Message],
        }
    }

    /// Render one record line.
    pub(crate) fn render(&self, name: &str, level: Level, message: &str) -> String {
        let mut line = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => line.push_str(text),
                Segment::Asctime => line.push_str(&timestamp()),
                Segment::Name => line.push_str(name),
                Segment::Levelname => line.push_str(level_name(level)),
                Segment::Message => line.push_str(message),
                Segment::Unknown => {}
            }
        }
        line
    }
}

/// Record timestamp, `2024-01-31 16:49:45,896` style.
fn timestamp() -> String {
    let now = chrono::Local::now();
    format!(
        "{},{:03}",
        now.format("%Y-%m-%d %H:%M:%S"),
        now.timestamp_subsec_millis()
    )
}

/// Conventional level names as they appear in log files.
fn level_name(level: Level) -> &'static str {
    match level {
        Level::Error => "ERROR",
        Level::Warn => "WARNING",
        Level::Info => "INFO",
        Level::Debug | Level::Trace => "DEBUG",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_level_and_message() {
        let formatter = RecordFormatter::parse("%(levelname)s: %(message)s");
        assert_eq!(
            formatter.render("vaayu", Level::Warn, "wind speed missing"),
            "WARNING: wind speed missing"
        );
    }

    #[test]
    fn renders_name_between_separators() {
        let formatter = RecordFormatter::parse("%(name)s:%(levelname)s: %(message)s");
        assert_eq!(
            formatter.render("vaayu.cfg", Level::Info, "loaded"),
            "vaayu.cfg:INFO: loaded"
        );
    }

    #[test]
    fn unknown_fields_render_empty() {
        let formatter = RecordFormatter::parse("[%(thread)s] %(message)s");
        assert_eq!(formatter.render("vaayu", Level::Info, "hi"), "[] hi");
    }

    #[test]
    fn escaped_percent_is_literal() {
        let formatter = RecordFormatter::parse("100%% %(message)s");
        assert_eq!(formatter.render("vaayu", Level::Info, "done"), "100% done");
    }
}
