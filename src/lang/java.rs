//! Java language support.

use super::Language;
use tree_sitter::Language as TsLanguage;

/// Reserved words that can never name a declaration.
const KEYWORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "final", "finally", "float",
    "for", "goto", "if", "implements", "import", "instanceof", "int", "interface", "long",
    "native", "new", "package", "private", "protected", "public", "return", "short", "static",
    "strictfp", "super", "switch", "synchronized", "this", "throw", "throws", "transient", "try",
    "void", "volatile", "while", "true", "false", "null",
];

/// Node kinds the grammar uses for primitive types.
pub const PRIMITIVE_TYPE_KINDS: &[&str] = &[
    "integral_type",
    "floating_point_type",
    "boolean_type",
    "void_type",
];

/// Java programming language.
pub struct Java;

impl Java {
    /// Returns true if `name` is a reserved word.
    pub fn is_keyword(name: &str) -> bool {
        KEYWORDS.contains(&name)
    }

    /// Returns true if `name` can be used as a Java identifier.
    pub fn is_identifier(name: &str) -> bool {
        let mut chars = name.chars();
        let Some(first) = chars.next() else {
            return false;
        };

        (first.is_alphabetic() || first == '_' || first == '$')
            && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
            && !Self::is_keyword(name)
    }

    /// Returns true if the node kind denotes a primitive type.
    pub fn is_primitive_kind(kind: &str) -> bool {
        PRIMITIVE_TYPE_KINDS.contains(&kind)
    }
}

impl Language for Java {
    fn name(&self) -> &'static str {
        "java"
    }

    fn extensions(&self) -> &[&'static str] {
        &["java"]
    }

    fn grammar(&self) -> TsLanguage {
        tree_sitter_java::LANGUAGE.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifiers() {
        assert!(Java::is_identifier("count"));
        assert!(Java::is_identifier("_tmp$1"));
        assert!(!Java::is_identifier(""));
        assert!(!Java::is_identifier("1abc"));
        assert!(!Java::is_identifier("two words"));
        assert!(!Java::is_identifier("class"));
    }

    #[test]
    fn test_primitive_kinds() {
        assert!(Java::is_primitive_kind("integral_type"));
        assert!(!Java::is_primitive_kind("type_identifier"));
    }
}
