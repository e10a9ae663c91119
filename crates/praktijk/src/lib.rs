//! Website service for the practice: public marketing pages, a contact form that
//! forwards messages by mail, and a password-protected backoffice for leave
//! periods and home-page popups.

pub mod auth;
pub mod config;
pub mod contact;
pub mod error;
pub mod records;
pub mod telemetry;
pub mod web;
