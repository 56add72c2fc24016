use thiserror::Error;

#[derive(Debug, Error)]
pub enum LiftLogError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Service unreachable: {0}")]
    Unreachable(String),

    #[error("Service error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Preference error: {0}")]
    Preference(String),
}

impl LiftLogError {
    /// Text shown to the user in a transient notification.
    pub fn user_message(&self) -> String {
        match self {
            LiftLogError::Validation(msg) => msg.clone(),
            LiftLogError::Unreachable(_) => {
                "Cannot reach the workout service. Check that the backend is running.".to_string()
            }
            LiftLogError::Server { message, .. } => format!("Server error: {}", message),
            LiftLogError::Decode(_) => "The workout service sent an unexpected response".to_string(),
            LiftLogError::Config(msg) => format!("Configuration problem: {}", msg),
            LiftLogError::Preference(msg) => format!("Could not save preferences: {}", msg),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, LiftLogError::Validation(_))
    }
}

impl From<LiftLogError> for String {
    fn from(err: LiftLogError) -> Self {
        err.to_string()
    }
}

pub type Result<T> = std::result::Result<T, LiftLogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreachable_and_server_messages_differ() {
        let unreachable = LiftLogError::Unreachable("connection refused".to_string());
        let server = LiftLogError::Server {
            status: 404,
            message: "User not found".to_string(),
        };

        assert!(unreachable.user_message().contains("Cannot reach"));
        assert_eq!(server.user_message(), "Server error: User not found");
    }

    #[test]
    fn test_validation_message_is_verbatim() {
        let err = LiftLogError::Validation("Enter an exercise name".to_string());
        assert_eq!(err.user_message(), "Enter an exercise name");
        assert!(err.is_validation());
    }
}
