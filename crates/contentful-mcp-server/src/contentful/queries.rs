//! Introspection documents sent to the Content API.

pub(super) const INTROSPECTION_OPERATION: &str = "IntrospectionQuery";

pub(super) const INTROSPECTION_QUERY: &str = r#"query IntrospectionQuery {
  __schema {
    queryType { name }
    mutationType { name }
    subscriptionType { name }
    types { ...FullType }
    directives {
      name
      locations
      args { ...InputValue }
    }
  }
}

fragment FullType on __Type {
  kind
  name
  fields(includeDeprecated: true) {
    name
    args { ...InputValue }
    type { ...TypeRef }
  }
  inputFields { ...InputValue }
  interfaces { ...TypeRef }
  enumValues(includeDeprecated: true) { name }
  possibleTypes { ...TypeRef }
}

fragment InputValue on __InputValue {
  name
  type { ...TypeRef }
  defaultValue
}

fragment TypeRef on __Type {
  kind
  name
  ofType {
    kind
    name
    ofType {
      kind
      name
      ofType {
        kind
        name
        ofType {
          kind
          name
          ofType {
            kind
            name
            ofType { kind name }
          }
        }
      }
    }
  }
}
"#;

pub(super) const CONTENT_TYPES_OPERATION: &str = "DiscoverContentTypes";

pub(super) const CONTENT_TYPES_QUERY: &str = r#"query DiscoverContentTypes {
  __schema {
    queryType {
      fields {
        name
        description
        type { kind name ofType { kind name } }
      }
    }
  }
}
"#;

pub(super) const TYPE_FIELDS_OPERATION: &str = "DiscoverTypeFields";

/// Variable holding the `index`th candidate type name
pub(super) fn type_name_variable(index: usize) -> String {
    format!("n{index}")
}

/// Alias of the `__type` lookup for the `index`th candidate
pub(super) fn type_alias(index: usize) -> String {
    format!("t{index}")
}

/// One aliased `__type` lookup per candidate name, answered in a single round trip.
pub(super) fn type_fields_query(candidates: usize) -> String {
    let variables = (0..candidates)
        .map(|i| format!("${}: String!", type_name_variable(i)))
        .collect::<Vec<_>>()
        .join(", ");
    let lookups = (0..candidates)
        .map(|i| {
            format!(
                "  {}: __type(name: ${}) {{ ...TypeFields }}\n",
                type_alias(i),
                type_name_variable(i)
            )
        })
        .collect::<String>();

    format!(
        "query {TYPE_FIELDS_OPERATION}({variables}) {{\n{lookups}}}\n\n\
         fragment TypeFields on __Type {{\n  \
           name\n  \
           description\n  \
           fields {{\n    \
             name\n    \
             description\n    \
             type {{ kind name ofType {{ kind name ofType {{ kind name }} }} }}\n  \
           }}\n\
         }}\n"
    )
}
