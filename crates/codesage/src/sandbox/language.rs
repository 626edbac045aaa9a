use std::fmt;

use serde::{Deserialize, Serialize};

/// A language the sandbox knows how to run.
///
/// The set is closed on purpose: adding a language is a compile-time-checked
/// change to this enum and its [`spec`](Language::spec), not a string that
/// can silently miss a match arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Javascript,
    Java,
    Cpp,
}

impl Language {
    /// All supported languages
    pub const ALL: [Language; 4] = [
        Language::Python,
        Language::Javascript,
        Language::Java,
        Language::Cpp,
    ];

    /// Resolve a wire tag to a language, `None` for unsupported tags
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "python" => Some(Language::Python),
            "javascript" => Some(Language::Javascript),
            "java" => Some(Language::Java),
            "cpp" => Some(Language::Cpp),
            _ => None,
        }
    }

    /// The wire tag for this language
    pub fn tag(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Javascript => "javascript",
            Language::Java => "java",
            Language::Cpp => "cpp",
        }
    }

    /// Check if the language needs a compile step
    pub fn is_compiled(&self) -> bool {
        self.spec().compile.is_some()
    }

    /// The toolchain commands and file names for this language
    pub fn spec(&self) -> LanguageSpec {
        match self {
            Language::Python => LanguageSpec {
                source_name: "main.py",
                compile: None,
                run_command: &["python3", "{source}"],
            },
            Language::Javascript => LanguageSpec {
                source_name: "main.js",
                compile: None,
                run_command: &["node", "{source}"],
            },
            Language::Java => LanguageSpec {
                // The public class must be named after the file
                source_name: "Solution.java",
                compile: Some(CompileSpec {
                    command: &["javac", "{source}"],
                    output_name: "Solution.class",
                }),
                run_command: &["java", "-cp", ".", "Solution"],
            },
            Language::Cpp => LanguageSpec {
                source_name: "main.cpp",
                compile: Some(CompileSpec {
                    command: &["g++", "{source}", "-o", "{binary}"],
                    output_name: "main",
                }),
                run_command: &["./{binary}"],
            },
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Toolchain configuration for one language
#[derive(Debug, Clone)]
pub struct LanguageSpec {
    /// Source file name inside the workspace
    pub source_name: &'static str,

    /// Compilation step (None for interpreted languages)
    pub compile: Option<CompileSpec>,

    /// Run command template.
    /// Placeholders: {source}, {binary}
    pub run_command: &'static [&'static str],
}

impl LanguageSpec {
    /// The artifact the run step invokes: the compiler output for compiled
    /// languages, the source file itself for interpreted ones.
    pub fn binary_name(&self) -> &'static str {
        match &self.compile {
            Some(compile) => compile.output_name,
            None => self.source_name,
        }
    }
}

/// Configuration for the compilation step
#[derive(Debug, Clone)]
pub struct CompileSpec {
    /// Command and arguments with placeholders
    /// Placeholders: {source}, {binary}
    pub command: &'static [&'static str],

    /// Artifact the compiler produces (e.g., "main", "Solution.class")
    pub output_name: &'static str,
}

/// Expand placeholders in a command template
pub fn expand_command(command: &[&str], source: &str, binary: &str) -> Vec<String> {
    command
        .iter()
        .map(|arg| arg.replace("{source}", source).replace("{binary}", binary))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_tag_supported() {
        assert_eq!(Language::from_tag("python"), Some(Language::Python));
        assert_eq!(Language::from_tag("javascript"), Some(Language::Javascript));
        assert_eq!(Language::from_tag("java"), Some(Language::Java));
        assert_eq!(Language::from_tag("cpp"), Some(Language::Cpp));
    }

    #[test]
    fn from_tag_unsupported() {
        assert_eq!(Language::from_tag("ruby"), None);
        assert_eq!(Language::from_tag(""), None);
        assert_eq!(Language::from_tag("Python"), None);
    }

    #[test]
    fn tag_round_trips() {
        for lang in Language::ALL {
            assert_eq!(Language::from_tag(lang.tag()), Some(lang));
        }
    }

    #[test]
    fn interpreted_languages_have_no_compile_step() {
        assert!(!Language::Python.is_compiled());
        assert!(!Language::Javascript.is_compiled());
    }

    #[test]
    fn compiled_languages_have_compile_step() {
        assert!(Language::Java.is_compiled());
        assert!(Language::Cpp.is_compiled());
    }

    #[test]
    fn binary_name_compiled() {
        assert_eq!(Language::Cpp.spec().binary_name(), "main");
        assert_eq!(Language::Java.spec().binary_name(), "Solution.class");
    }

    #[test]
    fn binary_name_interpreted_is_source() {
        assert_eq!(Language::Python.spec().binary_name(), "main.py");
    }

    #[test]
    fn expand_command_source_placeholder() {
        let result = expand_command(&["python3", "{source}"], "main.py", "main.py");
        assert_eq!(result, vec!["python3", "main.py"]);
    }

    #[test]
    fn expand_command_binary_placeholder() {
        let result = expand_command(&["./{binary}"], "main.cpp", "main");
        assert_eq!(result, vec!["./main"]);
    }

    #[test]
    fn expand_command_multiple_placeholders() {
        let result = expand_command(&["g++", "{source}", "-o", "{binary}"], "main.cpp", "main");
        assert_eq!(result, vec!["g++", "main.cpp", "-o", "main"]);
    }

    #[test]
    fn expand_command_no_placeholders() {
        let result = expand_command(&["java", "-cp", ".", "Solution"], "Solution.java", "x");
        assert_eq!(result, vec!["java", "-cp", ".", "Solution"]);
    }

    #[test]
    fn expand_command_only_documented_placeholders() {
        // Anything that is not {source} or {binary} passes through verbatim
        let result = expand_command(&["{output}", "{src}"], "main.cpp", "main");
        assert_eq!(result, vec!["{output}", "{src}"]);
    }

    #[test]
    fn serde_tags_are_lowercase() {
        let json = serde_json::to_string(&Language::Cpp).unwrap();
        assert_eq!(json, "\"cpp\"");
        let parsed: Language = serde_json::from_str("\"python\"").unwrap();
        assert_eq!(parsed, Language::Python);
    }
}
