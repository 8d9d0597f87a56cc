//! Rebuild a schema document from an introspection result.
//!
//! Contentful only exposes its schema through introspection, so the result is
//! rendered back into SDL and parsed with `apollo-compiler` to obtain a schema
//! that operations can be validated against.

use std::fmt;

use apollo_compiler::Schema;
use apollo_compiler::validation::Valid;
use serde::Deserialize;
use tracing::warn;

use super::type_ref::{TypeKind, TypeRef, normalize_type};

const BUILT_IN_SCALARS: [&str; 5] = ["String", "Int", "Float", "Boolean", "ID"];
const BUILT_IN_DIRECTIVES: [&str; 5] = ["skip", "include", "deprecated", "specifiedBy", "oneOf"];

/// The `__schema` object of a full introspection response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionSchema {
    pub query_type: Option<RootType>,
    #[serde(default)]
    pub mutation_type: Option<RootType>,
    #[serde(default)]
    pub subscription_type: Option<RootType>,
    #[serde(default)]
    pub types: Vec<FullType>,
    #[serde(default)]
    pub directives: Vec<Directive>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RootType {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullType {
    pub kind: TypeKind,
    pub name: String,
    #[serde(default)]
    pub fields: Option<Vec<Field>>,
    #[serde(default)]
    pub input_fields: Option<Vec<InputValue>>,
    #[serde(default)]
    pub interfaces: Option<Vec<TypeRef>>,
    #[serde(default)]
    pub enum_values: Option<Vec<EnumValue>>,
    #[serde(default)]
    pub possible_types: Option<Vec<TypeRef>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(default)]
    pub args: Vec<InputValue>,
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputValue {
    pub name: String,
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    #[serde(default)]
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnumValue {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Directive {
    pub name: String,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub args: Vec<InputValue>,
    #[serde(default, rename = "isRepeatable")]
    pub is_repeatable: bool,
}

impl IntrospectionSchema {
    /// Render the introspected types as SDL. Descriptions and deprecations are
    /// left out since validation does not need them.
    pub fn to_sdl(&self) -> String {
        self.to_string()
    }

    /// Parse the rendered SDL into a schema usable for operation validation.
    ///
    /// Remote schemas occasionally fail strict validation (empty object types,
    /// for instance); the partial schema is still good enough to check
    /// operations against, so it is kept with a warning.
    pub fn to_schema(&self) -> Valid<Schema> {
        match Schema::parse_and_validate(self.to_sdl(), "contentful.graphql") {
            Ok(schema) => schema,
            Err(with_errors) => {
                warn!(
                    "Introspected schema has {} validation issue(s); using it as-is",
                    with_errors.errors.len()
                );
                Valid::assume_valid(with_errors.partial)
            }
        }
    }
}

impl fmt::Display for IntrospectionSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(query_type) = &self.query_type {
            writeln!(f, "schema {{")?;
            writeln!(f, "  query: {}", query_type.name)?;
            if let Some(mutation_type) = &self.mutation_type {
                writeln!(f, "  mutation: {}", mutation_type.name)?;
            }
            if let Some(subscription_type) = &self.subscription_type {
                writeln!(f, "  subscription: {}", subscription_type.name)?;
            }
            writeln!(f, "}}\n")?;
        }

        for directive in self
            .directives
            .iter()
            .filter(|d| !BUILT_IN_DIRECTIVES.contains(&d.name.as_str()))
        {
            writeln!(
                f,
                "directive @{}{}{} on {}\n",
                directive.name,
                Arguments(&directive.args),
                if directive.is_repeatable {
                    " repeatable"
                } else {
                    ""
                },
                directive.locations.join(" | ")
            )?;
        }

        for full_type in self.types.iter().filter(|t| {
            !t.name.starts_with("__") && !BUILT_IN_SCALARS.contains(&t.name.as_str())
        }) {
            write!(f, "{full_type}")?;
        }

        Ok(())
    }
}

impl fmt::Display for FullType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TypeKind::Scalar => writeln!(f, "scalar {}\n", self.name),
            TypeKind::Object | TypeKind::Interface => {
                let keyword = if self.kind == TypeKind::Object {
                    "type"
                } else {
                    "interface"
                };
                let interfaces = self
                    .interfaces
                    .iter()
                    .flatten()
                    .filter_map(|i| i.name.as_deref())
                    .collect::<Vec<_>>();
                write!(f, "{keyword} {}", self.name)?;
                if !interfaces.is_empty() {
                    write!(f, " implements {}", interfaces.join(" & "))?;
                }
                let fields = self.fields.as_deref().unwrap_or_default();
                if fields.is_empty() {
                    return writeln!(f, "\n");
                }
                writeln!(f, " {{")?;
                for field in fields {
                    writeln!(
                        f,
                        "  {}{}: {}",
                        field.name,
                        Arguments(&field.args),
                        normalize_type(Some(&field.type_ref))
                    )?;
                }
                writeln!(f, "}}\n")
            }
            TypeKind::Union => {
                let members = self
                    .possible_types
                    .iter()
                    .flatten()
                    .filter_map(|t| t.name.as_deref())
                    .collect::<Vec<_>>();
                writeln!(f, "union {} = {}\n", self.name, members.join(" | "))
            }
            TypeKind::Enum => {
                writeln!(f, "enum {} {{", self.name)?;
                for value in self.enum_values.iter().flatten() {
                    writeln!(f, "  {}", value.name)?;
                }
                writeln!(f, "}}\n")
            }
            TypeKind::InputObject => {
                writeln!(f, "input {} {{", self.name)?;
                for input in self.input_fields.iter().flatten() {
                    writeln!(f, "  {input}")?;
                }
                writeln!(f, "}}\n")
            }
            TypeKind::List | TypeKind::NonNull | TypeKind::Other => Ok(()),
        }
    }
}

impl fmt::Display for InputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, normalize_type(Some(&self.type_ref)))?;
        if let Some(default_value) = &self.default_value {
            write!(f, " = {default_value}")?;
        }
        Ok(())
    }
}

/// A parenthesised argument list, empty when there are no arguments
struct Arguments<'a>(&'a [InputValue]);

impl fmt::Display for Arguments<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some((first, rest)) = self.0.split_first() else {
            return Ok(());
        };
        write!(f, "({first}")?;
        for arg in rest {
            write!(f, ", {arg}")?;
        }
        write!(f, ")")
    }
}
