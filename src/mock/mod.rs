/// Schema-matching mock server
///
/// The mock accepts exactly the requests the real server's schema accepts and
/// answers with placeholder data. It exists so generated operations and
/// sampled variables can be checked end to end without network access.

mod builder;
mod resolver;
mod scalars;
mod server;

pub use server::{router, serve};

use crate::error::Result;
use crate::schema::SchemaModel;
use async_graphql::dynamic::Schema;
use async_graphql::{Request, Variables};

#[derive(Clone)]
pub struct MockSchema {
    schema: Schema,
}

/// Response from the mock, in JSON form
#[derive(Debug, Clone, PartialEq)]
pub struct MockResponse {
    pub data: serde_json::Value,
    pub errors: Vec<String>,
}

impl MockResponse {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

impl MockSchema {
    pub fn build(model: &SchemaModel) -> Result<Self> {
        let schema = builder::build_schema(model)?;
        tracing::debug!("Built mock schema with {} types", model.types.len());
        Ok(Self { schema })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub async fn execute(
        &self,
        query: &str,
        operation_name: Option<&str>,
        variables: serde_json::Value,
    ) -> MockResponse {
        let mut request = Request::new(query).variables(Variables::from_json(variables));
        if let Some(name) = operation_name {
            request = request.operation_name(name);
        }

        let response = self.schema.execute(request).await;
        MockResponse {
            data: response.data.into_json().unwrap_or(serde_json::Value::Null),
            errors: response.errors.into_iter().map(|e| e.message).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::load_sdl;
    use serde_json::json;

    const SDL: &str = r#"
        scalar Date
        enum Gender { FEMALE MALE }
        interface Person { id: ID! }
        type Student implements Person { id: ID! name: String gender: Gender! born: Date }
        type Staff implements Person { id: ID! }
        union Member = Student | Staff
        input StudentInput { name: String! gender: Gender! born: Date limit: Int = 10 }
        type Query {
            student(id: ID!): Student
            students: [Student!]!
            me: Student!
            anyone: Member!
            people: [Person!]!
        }
        type Mutation { addStudent(input: StudentInput!): Student! }
    "#;

    fn mock() -> MockSchema {
        MockSchema::build(&load_sdl(SDL).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_placeholder_data() {
        let response = mock()
            .execute(
                "query Q { student(id: \"1\") { id } students { id } me { id name gender } anyone { __typename } }",
                Some("Q"),
                json!({}),
            )
            .await;
        assert!(response.is_ok(), "{:?}", response.errors);
        assert_eq!(response.data["student"], json!(null));
        assert_eq!(response.data["students"], json!([]));
        assert_eq!(response.data["me"], json!({ "id": "1", "name": null, "gender": "FEMALE" }));
        assert_eq!(response.data["anyone"]["__typename"], "Staff");
    }

    #[tokio::test]
    async fn test_variables_are_validated() {
        let mock = mock();
        let query = "mutation Add($input: StudentInput!) { addStudent(input: $input) { id } }";

        let ok = mock
            .execute(query, Some("Add"), json!({ "input": { "name": "Ama", "gender": "FEMALE" } }))
            .await;
        assert!(ok.is_ok(), "{:?}", ok.errors);

        let missing = mock.execute(query, Some("Add"), json!({ "input": { "name": "Ama" } })).await;
        assert!(!missing.is_ok());

        let bad_enum = mock
            .execute(query, Some("Add"), json!({ "input": { "name": "Ama", "gender": "OTHER" } }))
            .await;
        assert!(!bad_enum.is_ok());
    }

    #[tokio::test]
    async fn test_date_scalar_rejects_bad_input() {
        let mock = mock();
        let query = "mutation Add($input: StudentInput!) { addStudent(input: $input) { id } }";
        let bad = mock
            .execute(
                query,
                Some("Add"),
                json!({ "input": { "name": "Ama", "gender": "MALE", "born": "15/01/2010" } }),
            )
            .await;
        assert!(!bad.is_ok());

        let good = mock
            .execute(
                query,
                Some("Add"),
                json!({ "input": { "name": "Ama", "gender": "MALE", "born": "2010-01-15" } }),
            )
            .await;
        assert!(good.is_ok(), "{:?}", good.errors);
    }

    #[tokio::test]
    async fn test_unknown_field_is_rejected() {
        let response = mock().execute("query Q { nope }", Some("Q"), json!({})).await;
        assert!(!response.is_ok());
    }
}
