pub mod app_service;
pub mod probes;
pub mod safety;
pub mod status_service;
pub mod update_service;

#[cfg(test)]
pub(crate) mod testing;
