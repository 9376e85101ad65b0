//! Persistence adapter: reads calendars, preferences and meeting-assist
//! records over GraphQL.

pub mod graphql;
pub mod queries;
pub mod repository;

pub use graphql::GraphQlClient;
pub use repository::GraphQlRepository;
