//! Infrastructure layer - database access

pub mod storage;
