//! Argument blocks keyed by a logger id
//!
//! Options for one sink are passed on the command line as `--<id>.<key>=<value>`.
//! Values may be quoted and surrounded by whitespace, and the `=` may be
//! replaced by whitespace:
//!
//! ```text
//! app --main.path = "logs/main log.txt" --main.flushSize=10 --aux.path aux.txt
//! ```

/// Extract the `(key, value)` pairs of one id, in command-line order
///
/// A key that is followed by another option or by the end of the line gets
/// an empty value.
pub fn parse_block(id: &str, command_line: &str) -> Vec<(String, String)> {
    let prefix = format!("--{}.", id);
    let mut pairs = Vec::new();
    let mut rest = command_line;

    while let Some(position) = find_option(rest, &prefix) {
        rest = &rest[position + prefix.len()..];

        let key_end = rest
            .find(|c: char| c == '=' || c.is_whitespace())
            .unwrap_or(rest.len());
        let key = rest[..key_end].to_string();
        rest = rest[key_end..].trim_start();

        let explicit = rest.starts_with('=');
        if explicit {
            rest = rest[1..].trim_start();
        } else if rest.is_empty() || rest.starts_with("--") {
            pairs.push((key, String::new()));
            continue;
        }

        let (value, remaining) = take_value(rest);
        pairs.push((key, value.trim().to_string()));
        rest = remaining;
    }

    pairs
}

/// Position of `prefix` at the start of a token
fn find_option(text: &str, prefix: &str) -> Option<usize> {
    let mut offset = 0;
    while let Some(found) = text[offset..].find(prefix) {
        let position = offset + found;
        let at_token_start = text[..position]
            .chars()
            .next_back()
            .map_or(true, char::is_whitespace);
        if at_token_start {
            return Some(position);
        }
        offset = position + prefix.len();
    }
    None
}

/// Split off one value, honouring double quotes
fn take_value(text: &str) -> (&str, &str) {
    if let Some(quoted) = text.strip_prefix('"') {
        return match quoted.find('"') {
            Some(end) => (&quoted[..end], &quoted[end + 1..]),
            None => (quoted, ""),
        };
    }
    let end = text.find(char::is_whitespace).unwrap_or(text.len());
    (&text[..end], &text[end..])
}

/// The process arguments joined back into one line, quoting those with whitespace
pub fn env_command_line() -> String {
    std::env::args()
        .skip(1)
        .map(|arg| {
            if arg.chars().any(char::is_whitespace) {
                format!("\"{}\"", arg)
            } else {
                arg
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
