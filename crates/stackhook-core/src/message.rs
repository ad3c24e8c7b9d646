//! Notification texts in Telegram MarkdownV2.
//!
//! Every dynamic fragment is escaped for the context it is placed in; an
//! unescaped reserved character makes the messaging API reject the message.
use stackhook_model::{Branch, CommitId, CommitSummary};

/// Characters that must be backslash-escaped in plain MarkdownV2 text.
const RESERVED: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!', '\\',
];

/// Escape text outside of any entity.
pub fn escape(text: &str) -> String {
    escape_with(text, RESERVED)
}

/// Escape text placed inside a `` `code` `` span.
pub fn escape_code(text: &str) -> String {
    escape_with(text, &['`', '\\'])
}

/// Escape the URL part of an inline link `[label](url)`.
pub fn escape_link_url(url: &str) -> String {
    escape_with(url, &[')', '\\'])
}

fn escape_with(text: &str, reserved: &[char]) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if reserved.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Renders the messages sent during one confirmation workflow.
#[derive(Debug, Clone)]
pub struct Messages {
    stack: String,
    branch: Branch,
}

impl Messages {
    pub fn new(stack: impl Into<String>, branch: Branch) -> Self {
        Self {
            stack: stack.into(),
            branch,
        }
    }

    /// Announces a push and asks for confirmation.
    ///
    /// The head commit links to its web page when the payload carried one.
    pub fn confirmation(&self, head: &CommitId, commits: &[CommitSummary]) -> String {
        let headline = match commits.last().filter(|c| !c.url.is_empty()) {
            Some(last) => format!(
                "[_{}_]({})",
                escape(&last.id),
                escape_link_url(&last.url)
            ),
            None => format!("_{}_", escape(head.as_str())),
        };

        let listed = if commits.is_empty() {
            format!("`{}`", escape_code(head.as_str()))
        } else {
            commits
                .iter()
                .map(|c| format!("`{}`\n`{}`", escape_code(&c.id), escape_code(&c.message)))
                .collect::<Vec<_>>()
                .join("\n\n")
        };

        format!(
            "🚨 Commit {headline} has been pushed to the `{branch}` branch\\.\n\n\
             🚀 The following commits will be deployed\n{listed}\n\n\n\
             ⬇️ Click the button below to deploy to the *{stack}* stack\\.",
            branch = escape_code(self.branch.as_str()),
            stack = escape(&self.stack),
        )
    }

    pub fn deploying(&self, commit: &CommitId) -> String {
        format!(
            "🚀 Deploying commit `{}` to the *{}* stack\\.",
            escape_code(commit.as_str()),
            escape(&self.stack)
        )
    }

    pub fn deployed(&self, commit: &CommitId) -> String {
        format!(
            "✅ Commit `{}` has been deployed to the *{}* stack\\.",
            escape_code(commit.as_str()),
            escape(&self.stack)
        )
    }

    pub fn failed(&self, commit: &CommitId, reason: &str) -> String {
        format!(
            "❌ Deploying commit `{}` to the *{}* stack failed\\.\n\n`{}`",
            escape_code(commit.as_str()),
            escape(&self.stack),
            escape_code(reason)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages() -> Messages {
        Messages::new("web-prod", Branch::default())
    }

    fn commit(s: &str) -> CommitId {
        CommitId::new(s).unwrap()
    }

    #[test]
    fn escapes_reserved_characters() {
        assert_eq!(escape("v1.2-rc!"), "v1\\.2\\-rc\\!");
        assert_eq!(escape("a_b*c"), "a\\_b\\*c");
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn code_spans_only_escape_backtick_and_backslash() {
        assert_eq!(escape_code("fix: `x` in a\\b. done!"), "fix: \\`x\\` in a\\\\b. done!");
    }

    #[test]
    fn link_urls_escape_closing_paren() {
        assert_eq!(
            escape_link_url("https://e.com/a_(b)"),
            "https://e.com/a_(b\\)"
        );
    }

    #[test]
    fn confirmation_lists_commits_and_links_head() {
        let commits = vec![
            CommitSummary {
                id: "aaa111".into(),
                message: "first".into(),
                url: "https://git.example/c/aaa111".into(),
            },
            CommitSummary {
                id: "abc123".into(),
                message: "bump v1.2".into(),
                url: "https://git.example/c/abc123".into(),
            },
        ];

        let text = messages().confirmation(&commit("abc123"), &commits);

        assert!(text.contains("[_abc123_](https://git.example/c/abc123)"));
        assert!(text.contains("`aaa111`\n`first`\n\n`abc123`\n`bump v1.2`"));
        assert!(text.contains("`master` branch\\."));
        assert!(text.contains("*web\\-prod* stack\\."));
    }

    #[test]
    fn confirmation_without_commit_list_uses_head() {
        let text = messages().confirmation(&commit("abc123"), &[]);

        assert!(text.contains("Commit _abc123_ has been pushed"));
        assert!(text.contains("deployed\n`abc123`"));
    }

    #[test]
    fn status_messages_mention_commit_and_stack() {
        let m = messages();
        let c = commit("abc123");

        assert_eq!(
            m.deploying(&c),
            "🚀 Deploying commit `abc123` to the *web\\-prod* stack\\."
        );
        assert_eq!(
            m.deployed(&c),
            "✅ Commit `abc123` has been deployed to the *web\\-prod* stack\\."
        );
        assert!(m.failed(&c, "exit code 1").ends_with("`exit code 1`"));
    }
}
