use async_trait::async_trait;
use crate::core::library::LibraryError;

#[derive(Debug)]
pub enum CommandError {
    Database {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    DuplicateKey {
        message: String,
    },
    NotFound {
        message: String,
    },
    Runtime {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    // the stored data could not be mapped back into a book
    Serialization {
        message: String,
    },
    // the request body could not be parsed at all
    MalformedRequest {
        message: String,
    },
    Validation {
        messages: Vec<String>,
    },
}

impl CommandError {
    pub fn validation(messages: Vec<String>) -> CommandError {
        CommandError::Validation { messages }
    }

    pub fn malformed(message: &str) -> CommandError {
        CommandError::MalformedRequest { message: message.to_string() }
    }

    pub fn retryable(&self) -> bool {
        match self {
            CommandError::Database { retryable, .. } => { *retryable }
            CommandError::Runtime { retryable, .. } => { *retryable }
            _ => { false }
        }
    }

    pub fn reason_code(&self) -> Option<&str> {
        match self {
            CommandError::Database { reason_code, .. } => { reason_code.as_deref() }
            CommandError::Runtime { reason_code, .. } => { reason_code.as_deref() }
            _ => { None }
        }
    }
}

#[async_trait]
pub trait Command<Request, Response> {
    async fn execute(&self, req: Request) -> Result<Response, CommandError>;
}

impl From<LibraryError> for CommandError {
    fn from(other: LibraryError) -> Self {
        match other {
            LibraryError::Database { message, reason_code, retryable } => {
                CommandError::Database { message, reason_code, retryable }
            }
            LibraryError::DuplicateKey { message } => {
                CommandError::DuplicateKey { message }
            }
            LibraryError::NotFound { message } => {
                CommandError::NotFound { message }
            }
            LibraryError::CurrentlyUnavailable { message, reason_code, retryable } => {
                CommandError::Runtime { message, reason_code, retryable }
            }
            LibraryError::Validation { messages } => {
                CommandError::Validation { messages }
            }
            LibraryError::Serialization { message } => {
                CommandError::Serialization { message }
            }
            LibraryError::Runtime { message, reason_code } => {
                CommandError::Runtime { message, reason_code, retryable: true }
            }
        }
    }
}

impl From<serde_json::Error> for CommandError {
    fn from(err: serde_json::Error) -> Self {
        CommandError::malformed(format!("{}", err).as_str())
    }
}
