//! Field declarations built from parts and added to a type.

use super::{compute_insertion_point_with, insert_member, AnchorKind, DEFAULT_INDENT};
use crate::error::{RefactorError, Result};
use crate::imports;
use crate::lang::Java;
use crate::source::SourceFile;
use crate::types::BasicType;
use serde::{Deserialize, Serialize};
use tracing::debug;
use tree_sitter::Node;

/// Access modifier of a generated member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Visibility {
    #[default]
    Private,
    Protected,
    Public,
    /// No modifier.
    Package,
}

impl Visibility {
    /// The modifier keyword followed by a space, or nothing for package access.
    pub fn keyword(&self) -> &'static str {
        match self {
            Visibility::Private => "private ",
            Visibility::Protected => "protected ",
            Visibility::Public => "public ",
            Visibility::Package => "",
        }
    }
}

/// A field declaration to generate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub type_name: String,
    pub name: String,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_final: bool,
    #[serde(default)]
    pub initializer: Option<String>,
}

impl FieldSpec {
    /// A private field with no initializer.
    pub fn new(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            name: name.into(),
            visibility: Visibility::default(),
            is_static: false,
            is_final: false,
            initializer: None,
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn public(self) -> Self {
        self.with_visibility(Visibility::Public)
    }

    pub fn static_field(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn final_field(mut self) -> Self {
        self.is_final = true;
        self
    }

    pub fn with_initializer(mut self, initializer: impl Into<String>) -> Self {
        self.initializer = Some(initializer.into());
        self
    }

    /// Renders the declaration: `private static final Type name = init;`.
    pub fn render(&self) -> String {
        let mut rendered = String::from(self.visibility.keyword());
        if self.is_static {
            rendered.push_str("static ");
        }
        if self.is_final {
            rendered.push_str("final ");
        }
        rendered.push_str(&self.type_name);
        rendered.push(' ');
        rendered.push_str(&self.name);
        if let Some(initializer) = &self.initializer {
            rendered.push_str(" = ");
            rendered.push_str(initializer);
        }
        rendered.push(';');
        rendered
    }

    /// Known library types mentioned by the declared type that need an import.
    pub fn required_imports(&self) -> Vec<BasicType> {
        let mut required: Vec<BasicType> = Vec::new();
        let names = self
            .type_name
            .split(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$'))
            .filter(|name| !name.is_empty());
        for name in names {
            if let Some(basic) = BasicType::lookup(name) {
                if basic.needs_import() && !required.contains(&basic) {
                    required.push(basic);
                }
            }
        }
        required
    }

    fn validate(&self) -> Result<()> {
        if self.type_name.trim().is_empty() {
            return Err(RefactorError::invalid_argument("field type must not be empty"));
        }
        if !Java::is_identifier(&self.name) {
            return Err(RefactorError::invalid_argument(format!(
                "{:?} is not a valid field name",
                self.name
            )));
        }
        Ok(())
    }
}

/// Adds a field to a type and imports any known library type it mentions.
///
/// `body` may be the type declaration or its body. Returns `Ok(None)` when
/// `body` is not a type that can hold members.
pub fn add_field(
    file: &SourceFile,
    body: Node<'_>,
    spec: &FieldSpec,
    anchor: AnchorKind,
) -> Result<Option<SourceFile>> {
    add_field_with(file, body, spec, anchor, DEFAULT_INDENT)
}

/// [`add_field`] with an explicit indent unit.
pub fn add_field_with(
    file: &SourceFile,
    body: Node<'_>,
    spec: &FieldSpec,
    anchor: AnchorKind,
    indent_unit: &str,
) -> Result<Option<SourceFile>> {
    spec.validate()?;
    let Some(point) = compute_insertion_point_with(file, body, anchor, indent_unit) else {
        debug!(kind = body.kind(), "cannot add field: not a type body");
        return Ok(None);
    };

    let mut updated = insert_member(file, &point, &spec.render())?;
    // Every import below is computed against the text it is applied to.
    for basic in spec.required_imports() {
        if let Some(package) = basic.package {
            updated = imports::add_import(&updated, package, basic.type_name)?;
        }
    }
    debug!(field = %spec.name, anchor = %point.anchor, "added field");
    Ok(Some(updated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::{fields_of, find_class_by_name};

    #[test]
    fn test_render() {
        assert_eq!(FieldSpec::new("String", "name").render(), "private String name;");
        assert_eq!(
            FieldSpec::new("long", "serialVersionUID")
                .static_field()
                .final_field()
                .with_initializer("1L")
                .render(),
            "private static final long serialVersionUID = 1L;"
        );
        assert_eq!(
            FieldSpec::new("int", "count")
                .with_visibility(Visibility::Package)
                .render(),
            "int count;"
        );
    }

    #[test]
    fn test_required_imports() {
        let spec = FieldSpec::new("Map<String, List<BigDecimal>>", "totals");
        let packages: Vec<String> = spec
            .required_imports()
            .iter()
            .map(BasicType::fully_qualified_name)
            .collect();
        assert_eq!(packages, ["java.util.Map", "java.util.List", "java.math.BigDecimal"]);
        assert!(FieldSpec::new("int", "n").required_imports().is_empty());
    }

    #[test]
    fn test_add_field_with_import() {
        let source = "package shop;\n\npublic class Order {\n    private String id;\n}\n";
        let file = SourceFile::parse(source).unwrap();
        let class = find_class_by_name(&file, "Order").unwrap();
        let spec = FieldSpec::new("LocalDate", "placedOn");

        let updated = add_field(&file, class, &spec, AnchorKind::AfterLastField)
            .unwrap()
            .unwrap();
        assert_eq!(
            updated.text(),
            "package shop;\n\nimport java.time.LocalDate;\n\npublic class Order {\n    private String id;\n    private LocalDate placedOn;\n}\n"
        );

        let class = find_class_by_name(&updated, "Order").unwrap();
        assert_eq!(fields_of(&updated, class).len(), 2);
    }

    #[test]
    fn test_add_field_keeps_existing_import() {
        let source = "import java.util.*;\n\nclass Cart {\n}\n";
        let file = SourceFile::parse(source).unwrap();
        let class = find_class_by_name(&file, "Cart").unwrap();
        let spec = FieldSpec::new("List<String>", "items").final_field();

        let updated = add_field(&file, class, &spec, AnchorKind::BeforeFirstField)
            .unwrap()
            .unwrap();
        assert_eq!(
            updated.text(),
            "import java.util.*;\n\nclass Cart {\n    private final List<String> items;\n}\n"
        );
    }

    #[test]
    fn test_add_field_rejects_bad_input() {
        let file = SourceFile::parse("class A {}").unwrap();
        let class = find_class_by_name(&file, "A").unwrap();
        assert!(add_field(&file, class, &FieldSpec::new("int", "1x"), AnchorKind::AfterLastField).is_err());
        assert!(add_field(&file, class, &FieldSpec::new(" ", "x"), AnchorKind::AfterLastField).is_err());

        let root = file.root();
        assert!(add_field(&file, root, &FieldSpec::new("int", "x"), AnchorKind::AfterLastField)
            .unwrap()
            .is_none());
    }
}
