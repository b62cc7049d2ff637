//! Meetup platform backend.
//!
//! Users organise interest groups, groups host geotagged meetups, users
//! confirm attendance, and the detail page surfaces other meetups nearby.
//! The crate is laid out hexagonally: [`domain`] holds the entities,
//! services, and ports; [`inbound`] adapts HTTP onto the driving ports;
//! [`outbound`] implements the driven ports over PostgreSQL; [`server`]
//! wires the two sides together.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod server;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
