//! HTNG 2011B XML layer: namespace/schema registry, validation, SOAP
//! header construction, per-MessageType builders, and inbound parsers.

pub mod builders;
pub mod namespace;
pub mod parsers;
pub mod schema;
pub mod soap_header;
pub mod validator;
pub mod wsdl;

pub use soap_header::{build_header, generate_nonce, SoapHeaderInputs, WsseCredentials};
pub use validator::{check_well_formed, check_xsd, validate, ValidationIssue};
