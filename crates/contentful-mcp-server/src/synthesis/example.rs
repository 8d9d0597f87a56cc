use std::fmt;

use super::{collection_field_name, leaf_type_name, operation_stem, single_field_name};
use crate::contentful::{ContentTypeSchema, FieldDescriptor};
use crate::introspection::{is_reference, is_scalar};

const EXAMPLE_LIMIT: u32 = 5;

/// Selected explicitly on every item
const SYS_FIELD: &str = "sys";

/// A commented document showing how to list entries of the type and fetch one by id.
///
/// With `include_relations`, reference fields are added as inline fragment
/// placeholders for the caller to fill in.
pub fn example_query(schema: &ContentTypeSchema, include_relations: bool) -> String {
    let scalars: Vec<&FieldDescriptor> = schema
        .fields
        .iter()
        .filter(|field| field.name != SYS_FIELD && is_scalar(&field.type_name))
        .collect();
    let references: Vec<&FieldDescriptor> = if include_relations {
        schema
            .fields
            .iter()
            .filter(|field| field.name != SYS_FIELD && is_reference(&field.type_name))
            .collect()
    } else {
        Vec::new()
    };

    ExampleDocument {
        schema,
        scalars: &scalars,
        references: &references,
    }
    .to_string()
}

struct ExampleDocument<'a> {
    schema: &'a ContentTypeSchema,
    scalars: &'a [&'a FieldDescriptor],
    references: &'a [&'a FieldDescriptor],
}

impl ExampleDocument<'_> {
    fn write_selection(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let pad = " ".repeat(indent);
        writeln!(f, "{pad}{SYS_FIELD} {{")?;
        writeln!(f, "{pad}  id")?;
        writeln!(f, "{pad}}}")?;
        for field in self.scalars {
            writeln!(f, "{pad}{}", field.name)?;
        }
        for field in self.references {
            let type_name = leaf_type_name(&field.type_name);
            writeln!(f, "{pad}{} {{", field.name)?;
            writeln!(f, "{pad}  ... on {type_name} {{")?;
            writeln!(f, "{pad}    # {type_name} fields")?;
            writeln!(f, "{pad}  }}")?;
            writeln!(f, "{pad}}}")?;
        }
        Ok(())
    }
}

impl fmt::Display for ExampleDocument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let schema = self.schema;
        let stem = operation_stem(schema);

        writeln!(f, "# Example queries for {}", schema.content_type)?;
        if let Some(description) = &schema.description {
            writeln!(f, "# {description}")?;
        }
        writeln!(f)?;

        writeln!(f, "# List entries")?;
        writeln!(f, "query {stem}CollectionExample {{")?;
        writeln!(
            f,
            "  {}(limit: {EXAMPLE_LIMIT}) {{",
            collection_field_name(&schema.content_type)
        )?;
        writeln!(f, "    items {{")?;
        self.write_selection(f, 6)?;
        writeln!(f, "    }}")?;
        writeln!(f, "  }}")?;
        writeln!(f, "}}")?;
        writeln!(f)?;

        writeln!(f, "# Fetch one entry by id")?;
        writeln!(f, "query {stem}Example($id: String!) {{")?;
        writeln!(f, "  {}(id: $id) {{", single_field_name(&schema.content_type))?;
        self.write_selection(f, 4)?;
        writeln!(f, "  }}")?;
        writeln!(f, "}}")?;
        writeln!(f)?;

        writeln!(f, "# Variables:")?;
        writeln!(f, "# {{")?;
        writeln!(f, "#   \"id\": \"your-entry-id\"")?;
        write!(f, "# }}")
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::*;

    fn page_article() -> ContentTypeSchema {
        ContentTypeSchema {
            content_type: "PageArticle".to_string(),
            description: Some("A blog article".to_string()),
            fields: vec![
                FieldDescriptor::new("sys", "Sys!"),
                FieldDescriptor::new("title", "String"),
                FieldDescriptor::new("publishedAt", "DateTime"),
                FieldDescriptor::new("author", "Author"),
                FieldDescriptor::new("relatedArticles", "[PageArticle]"),
                FieldDescriptor::new("linkedFrom", "PageArticleLinkingCollections"),
            ],
        }
    }

    #[test]
    fn example_without_relations() {
        assert_snapshot!(example_query(&page_article(), false), @r##"
        # Example queries for PageArticle
        # A blog article

        # List entries
        query PageArticleCollectionExample {
          pageArticleCollection(limit: 5) {
            items {
              sys {
                id
              }
              title
              publishedAt
            }
          }
        }

        # Fetch one entry by id
        query PageArticleExample($id: String!) {
          pageArticle(id: $id) {
            sys {
              id
            }
            title
            publishedAt
          }
        }

        # Variables:
        # {
        #   "id": "your-entry-id"
        # }
        "##);
    }

    #[test]
    fn relations_become_fragment_placeholders() {
        let document = example_query(&page_article(), true);

        assert!(document.contains("      author {\n        ... on Author {\n"));
        assert!(document.contains("    relatedArticles {\n      ... on PageArticle {\n"));
        assert!(!document.contains("linkedFrom"));
        assert!(!document.contains("... on Sys"));
    }

    #[test]
    fn collection_types_use_the_base_name() {
        let schema = ContentTypeSchema::new(
            "ArticleCollection",
            vec![FieldDescriptor::new("total", "Int!")],
        );

        let document = example_query(&schema, false);

        assert!(document.contains("query ArticleCollectionExample {"));
        assert!(document.contains("  articleCollection(limit: 5) {"));
        assert!(document.contains("  article(id: $id) {"));
    }
}
