pub mod appointment;
pub mod budget;
pub mod client;
pub mod collaborator;
pub mod config;
pub mod contract;
pub mod dashboard;
pub mod documents;
pub mod gallery;
pub mod ledger;
pub mod site;
pub mod slide;
pub mod team;
pub mod upload;
pub mod utils;
