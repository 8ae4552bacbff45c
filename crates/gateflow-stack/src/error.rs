use thiserror::Error;

#[derive(Error, Debug)]
pub enum StackError {
    #[error(transparent)]
    Core(#[from] gateflow_core::CoreError),

    #[error(transparent)]
    Provision(#[from] gateflow_provision::ProvisionError),
}

pub type Result<T> = std::result::Result<T, StackError>;
