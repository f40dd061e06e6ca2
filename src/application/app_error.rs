use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("No member is registered with this email. Please contact admin to register.")]
    MemberNotFound,

    #[error("This account is inactive. Please contact admin.")]
    MemberInactive,

    #[error("Invalid code. Please check and try again.")]
    InvalidCode,

    #[error("Code has expired. Please request a new one.")]
    CodeExpired,

    #[error("Member is already signed in")]
    AlreadySignedIn,

    #[error("Member has no open visit to sign out of")]
    NoOpenVisit,

    #[error("A member with this email already exists")]
    DuplicateEmail,

    #[error("No active check-in session")]
    NoActiveSession,

    #[error("Email delivery failed: {0}")]
    DeliveryFailure(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found")]
    NotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Clone, Copy, Debug)]
pub enum ErrorCode {
    DatabaseError,
    MemberNotFound,
    MemberInactive,
    InvalidCode,
    CodeExpired,
    AlreadySignedIn,
    NoOpenVisit,
    DuplicateEmail,
    NoActiveSession,
    DeliveryFailure,
    InvalidCredentials,
    InvalidInput,
    NotFound,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::MemberNotFound => "MEMBER_NOT_FOUND",
            ErrorCode::MemberInactive => "MEMBER_INACTIVE",
            ErrorCode::InvalidCode => "INVALID_CODE",
            ErrorCode::CodeExpired => "CODE_EXPIRED",
            ErrorCode::AlreadySignedIn => "ALREADY_SIGNED_IN",
            ErrorCode::NoOpenVisit => "NO_OPEN_VISIT",
            ErrorCode::DuplicateEmail => "DUPLICATE_EMAIL",
            ErrorCode::NoActiveSession => "NO_ACTIVE_SESSION",
            ErrorCode::DeliveryFailure => "DELIVERY_FAILURE",
            ErrorCode::InvalidCredentials => "INVALID_CREDENTIALS",
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Database(_) => ErrorCode::DatabaseError,
            AppError::MemberNotFound => ErrorCode::MemberNotFound,
            AppError::MemberInactive => ErrorCode::MemberInactive,
            AppError::InvalidCode => ErrorCode::InvalidCode,
            AppError::CodeExpired => ErrorCode::CodeExpired,
            AppError::AlreadySignedIn => ErrorCode::AlreadySignedIn,
            AppError::NoOpenVisit => ErrorCode::NoOpenVisit,
            AppError::DuplicateEmail => ErrorCode::DuplicateEmail,
            AppError::NoActiveSession => ErrorCode::NoActiveSession,
            AppError::DeliveryFailure(_) => ErrorCode::DeliveryFailure,
            AppError::InvalidCredentials => ErrorCode::InvalidCredentials,
            AppError::InvalidInput(_) => ErrorCode::InvalidInput,
            AppError::NotFound => ErrorCode::NotFound,
            AppError::Internal(_) => ErrorCode::InternalError,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
