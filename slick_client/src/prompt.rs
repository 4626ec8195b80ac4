use std::io::{self, Read};

pub const STDIN: &str = "{stdin}";
pub const STDIN_LINE: &str = "{stdin_line}";
pub const STDIN_STREAM: &str = "{stdin_stream}";

/// How standard input feeds the prompt template. Decided once from the
/// template's placeholder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PromptMode {
    /// One generation. All of standard input replaces `{stdin}`, or input
    /// is left unread when the template has no placeholder.
    Block,
    /// One independent generation per input line.
    LineWise,
    /// Meant to carry state from line to line. Until a server supports a
    /// sliding window this runs exactly like `LineWise`.
    Stream,
}

impl PromptMode {
    pub fn detect(template: &str) -> Self {
        if template.contains(STDIN) {
            Self::Block
        } else if template.contains(STDIN_LINE) {
            Self::LineWise
        } else if template.contains(STDIN_STREAM) {
            Self::Stream
        } else {
            Self::Block
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            Self::Block => STDIN,
            Self::LineWise => STDIN_LINE,
            Self::Stream => STDIN_STREAM,
        }
    }
}

/// The single prompt for block mode. Empty input fills in an empty string.
pub fn block_prompt<R: Read>(template: &str, mut input: R) -> io::Result<String> {
    if !template.contains(STDIN) {
        return Ok(template.to_string());
    }
    let mut stdin = String::new();
    input.read_to_string(&mut stdin)?;
    Ok(template.replace(STDIN, &stdin))
}

/// The prompt for one input line, trimmed of surrounding whitespace.
pub fn line_prompt(template: &str, mode: PromptMode, line: &str) -> String {
    template.replace(mode.placeholder(), line.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detection_precedence() {
        assert_eq!(PromptMode::detect("Summarize: {stdin}"), PromptMode::Block);
        assert_eq!(PromptMode::detect("{stdin_line} -> French"), PromptMode::LineWise);
        assert_eq!(PromptMode::detect("Next: {stdin_stream}"), PromptMode::Stream);
        assert_eq!(PromptMode::detect("Tell me a joke"), PromptMode::Block);
        assert_eq!(PromptMode::detect("{stdin_line} {stdin}"), PromptMode::Block);
    }

    #[test]
    fn block_reads_everything() {
        let prompt = block_prompt("Summarize:\n{stdin}", "one\ntwo\n".as_bytes()).unwrap();
        assert_eq!(prompt, "Summarize:\none\ntwo\n");
        assert_eq!(block_prompt("Echo '{stdin}'", io::empty()).unwrap(), "Echo ''");
    }

    #[test]
    fn block_without_placeholder_leaves_input() {
        let mut input = "unread".as_bytes();
        assert_eq!(block_prompt("Tell me a joke", &mut input).unwrap(), "Tell me a joke");
        assert_eq!(input, b"unread");
    }

    #[test]
    fn lines_are_trimmed() {
        assert_eq!(
            line_prompt("Translate: {stdin_line}", PromptMode::LineWise, "  hello \r"),
            "Translate: hello"
        );
        assert_eq!(
            line_prompt("[{stdin_stream}]", PromptMode::Stream, "world"),
            "[world]"
        );
    }
}
