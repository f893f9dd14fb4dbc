//! Catalogue of well-known JDK types and where they live.

/// A well-known type and the package it is imported from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasicType {
    pub type_name: &'static str,
    /// `None` for primitives.
    pub package: Option<&'static str>,
}

const fn known(type_name: &'static str, package: &'static str) -> BasicType {
    BasicType {
        type_name,
        package: Some(package),
    }
}

const fn primitive(type_name: &'static str) -> BasicType {
    BasicType {
        type_name,
        package: None,
    }
}

impl BasicType {
    /// Known types in lookup order; the first entry wins for ambiguous names such as `Date`.
    pub const ALL: &'static [BasicType] = &[
        known("String", "java.lang"),
        known("Long", "java.lang"),
        known("Integer", "java.lang"),
        known("Boolean", "java.lang"),
        known("Double", "java.lang"),
        known("Float", "java.lang"),
        known("Short", "java.lang"),
        known("Byte", "java.lang"),
        known("Character", "java.lang"),
        known("Object", "java.lang"),
        known("Class", "java.lang"),
        known("BigDecimal", "java.math"),
        known("BigInteger", "java.math"),
        known("Instant", "java.time"),
        known("Duration", "java.time"),
        known("LocalDate", "java.time"),
        known("LocalTime", "java.time"),
        known("LocalDateTime", "java.time"),
        known("OffsetDateTime", "java.time"),
        known("OffsetTime", "java.time"),
        known("ZonedDateTime", "java.time"),
        known("ZoneOffset", "java.time"),
        known("Date", "java.util"),
        known("Calendar", "java.util"),
        known("Currency", "java.util"),
        known("Locale", "java.util"),
        known("TimeZone", "java.util"),
        known("UUID", "java.util"),
        known("List", "java.util"),
        known("ArrayList", "java.util"),
        known("LinkedList", "java.util"),
        known("Set", "java.util"),
        known("HashSet", "java.util"),
        known("LinkedHashSet", "java.util"),
        known("TreeSet", "java.util"),
        known("Map", "java.util"),
        known("HashMap", "java.util"),
        known("Collection", "java.util"),
        known("Optional", "java.util"),
        known("Time", "java.sql"),
        known("Timestamp", "java.sql"),
        known("Blob", "java.sql"),
        known("Clob", "java.sql"),
        known("NClob", "java.sql"),
        known("URL", "java.net"),
        known("InetAddress", "java.net"),
        primitive("boolean"),
        primitive("byte"),
        primitive("char"),
        primitive("short"),
        primitive("int"),
        primitive("long"),
        primitive("float"),
        primitive("double"),
    ];

    /// Looks up a type by simple name; generic arguments and array brackets are ignored.
    pub fn lookup(type_name: &str) -> Option<BasicType> {
        let base = type_name
            .split(['<', '['])
            .next()
            .unwrap_or(type_name)
            .trim();
        Self::ALL.iter().copied().find(|t| t.type_name == base)
    }

    /// Returns true if using this type requires an import statement.
    pub fn needs_import(&self) -> bool {
        self.package.is_some_and(|p| p != "java.lang")
    }

    pub fn is_primitive(&self) -> bool {
        self.package.is_none()
    }

    pub fn fully_qualified_name(&self) -> String {
        match self.package {
            Some(package) => format!("{package}.{}", self.type_name),
            None => self.type_name.to_string(),
        }
    }
}
