use tracing::{debug, info, warn};

/// How captured process output is forwarded to the log.
#[derive(Debug, Clone, Copy)]
pub struct OutputLogConfig {
    /// Max line length before truncation.
    pub max_line_length: usize,
    /// Log stdout at INFO level (false = DEBUG).
    pub stdout_info: bool,
    /// Log stderr at WARN level (false = DEBUG).
    pub stderr_warn: bool,
}

impl Default for OutputLogConfig {
    fn default() -> Self {
        Self {
            max_line_length: 4096,
            stdout_info: true,
            stderr_warn: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stream {
    Stdout,
    Stderr,
}

impl OutputLogConfig {
    pub(crate) fn log(&self, program: &str, stream: Stream, bytes: &[u8]) {
        let text = String::from_utf8_lossy(bytes);
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            let line = truncate(line, self.max_line_length);
            match stream {
                Stream::Stdout if self.stdout_info => info!(program, "{line}"),
                Stream::Stderr if self.stderr_warn => warn!(program, "{line}"),
                Stream::Stdout => debug!(program, stream = "stdout", "{line}"),
                Stream::Stderr => debug!(program, stream = "stderr", "{line}"),
            }
        }
    }
}

fn truncate(line: &str, max: usize) -> &str {
    if line.len() <= max {
        return line;
    }
    let mut end = max;
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    &line[..end]
}
