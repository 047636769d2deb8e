//! Prompt Templates
//!
//! Templates are Markdown files keyed by file stem. The built-in set is compiled
//! in from the workspace `prompts/` directory; a deployment can overlay its own
//! copies from any directory.

use std::{collections::HashMap, fs, io, path::Path};
use tracing::info;

pub const TASK_SPECIFIER: &str = "task_specifier";
pub const ASSISTANT_INCEPTION: &str = "assistant_inception";
pub const USER_INCEPTION: &str = "user_inception";
pub const SUMMARIZER: &str = "summarizer";
pub const INSTRUCTOR: &str = "instructor";
pub const ASSIGNMENT: &str = "assignment";
pub const QUIZ: &str = "quiz";
pub const FLASHCARDS: &str = "flashcards";

const BUILTIN: [(&str, &str); 8] = [
    (TASK_SPECIFIER, include_str!("../../../prompts/task_specifier.md")),
    (ASSISTANT_INCEPTION, include_str!("../../../prompts/assistant_inception.md")),
    (USER_INCEPTION, include_str!("../../../prompts/user_inception.md")),
    (SUMMARIZER, include_str!("../../../prompts/summarizer.md")),
    (INSTRUCTOR, include_str!("../../../prompts/instructor.md")),
    (ASSIGNMENT, include_str!("../../../prompts/assignment.md")),
    (QUIZ, include_str!("../../../prompts/quiz.md")),
    (FLASHCARDS, include_str!("../../../prompts/flashcards.md")),
];

/// A set of named prompt templates.
#[derive(Debug, Clone)]
pub struct Prompts {
    templates: HashMap<String, String>,
}

impl Default for Prompts {
    fn default() -> Self {
        let templates = BUILTIN
            .iter()
            .map(|(key, text)| (key.to_string(), text.trim_end().to_string()))
            .collect();
        Self { templates }
    }
}

impl Prompts {
    /// Starts from the built-in templates and replaces every one for which the
    /// directory holds a `<key>.md` file. Unknown keys are added as-is.
    pub fn load_dir(dir: &Path) -> io::Result<Self> {
        let mut prompts = Self::default();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("md") {
                continue;
            }
            let Some(key) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let content = fs::read_to_string(&path)?;
            info!(prompt = %key, path = %path.display(), "Loaded prompt override");
            prompts
                .templates
                .insert(key.to_string(), content.trim_end().to_string());
        }
        Ok(prompts)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.templates.get(key).map(String::as_str)
    }

    /// Renders a template, substituting `{name}` placeholders in a single pass so
    /// that substituted text is never re-scanned. A missing template renders as
    /// an empty string.
    pub fn render(&self, key: &str, vars: &[(&str, &str)]) -> String {
        render_template(self.get(key).unwrap_or_default(), vars)
    }
}

pub fn render_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let replaced = after.find('}').and_then(|close| {
            let name = &after[..close];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });
        match replaced {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_templates_present() {
        let prompts = Prompts::default();
        for (key, _) in BUILTIN {
            assert!(!prompts.get(key).unwrap().is_empty(), "empty template {key}");
        }
        assert!(prompts.get(USER_INCEPTION).unwrap().contains("<TASK_DONE>"));
        assert!(prompts.get(INSTRUCTOR).unwrap().contains("<END_OF_TURN>"));
    }

    #[test]
    fn test_render_replaces_known_placeholders() {
        let out = render_template("Teach {topic} in {n} steps", &[("topic", "Rust"), ("n", "3")]);
        assert_eq!(out, "Teach Rust in 3 steps");
    }

    #[test]
    fn test_render_keeps_unknown_placeholders() {
        let out = render_template("Q: <question> {unknown} {", &[("topic", "x")]);
        assert_eq!(out, "Q: <question> {unknown} {");
    }

    #[test]
    fn test_render_does_not_rescan_substitutions() {
        let out = render_template("{a}|{b}", &[("a", "{b}"), ("b", "B")]);
        assert_eq!(out, "{b}|B");
    }

    #[test]
    fn test_load_dir_overrides_builtin() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("quiz.md"), "Quiz about {topic}\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let prompts = Prompts::load_dir(dir.path()).unwrap();
        assert_eq!(prompts.render(QUIZ, &[("topic", "Sets")]), "Quiz about Sets");
        assert!(prompts.get("notes").is_none());
        assert!(prompts.get(ASSIGNMENT).is_some());
    }
}
