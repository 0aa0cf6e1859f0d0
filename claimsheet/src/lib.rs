pub mod acquire;
pub mod credentials;
pub mod pipeline;

pub use acquire::{
    acquire, claim_file_ids, AcquisitionError, AcquisitionResult, ClaimFetcher, DciFetcher,
    DEFAULT_FETCH_COMMAND,
};
pub use credentials::{
    parse_exports, CredentialChain, CredentialProvider, Credentials, CredentialsFile,
    ProcessEnvironment, StaticCredentials, DEFAULT_CREDENTIALS_FILE, REQUIRED_VARIABLES,
};
pub use pipeline::{generate_report, run, AppError, AppResult, RunOptions, RunReport};
