//! Behavioural scenarios for volume creation.

mod create;
