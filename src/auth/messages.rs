//! Machine-readable message codes of the authentication API surface.
//!
//! Clients branch on these strings, so they are part of the wire contract;
//! change them only with a coordinated client release.

pub const NAME_IS_REQUIRED: &str = "NAME_IS_REQUIRED";
pub const EMAIL_IS_REQUIRED: &str = "EMAIL_IS_REQUIRED";
pub const EMAIL_IS_INVALID: &str = "EMAIL_IS_INVALID";
pub const EMAIL_ALREADY_EXISTS: &str = "EMAIL_ALREADY_EXISTS";
pub const PASSWORD_IS_REQUIRED: &str = "PASSWORD_IS_REQUIRED";
pub const PASSWORD_MUST_BE_STRONG: &str = "PASSWORD_MUST_BE_STRONG";
pub const CONFIRM_PASSWORD_IS_REQUIRED: &str = "CONFIRM_PASSWORD_IS_REQUIRED";
pub const CONFIRM_PASSWORD_NOT_MATCH: &str = "CONFIRM_PASSWORD_NOT_MATCH";
pub const DATE_OF_BIRTH_MUST_BE_ISO8061: &str = "DATE_OF_BIRTH_MUST_BE_ISO8061";

pub const EMAIL_OR_PASSWORD_INCORRECT: &str = "EMAIL_OR_PASSWORD_INCORRECT";
pub const USER_NOT_FOUND: &str = "USER_NOT_FOUND";
pub const USER_BANNED: &str = "USER_BANNED";

pub const ACCESS_TOKEN_IS_REQUIRED: &str = "ACCESS_TOKEN_IS_REQUIRED";
pub const REFRESH_TOKEN_IS_REQUIRED: &str = "REFRESH_TOKEN_IS_REQUIRED";
pub const REFRESH_TOKEN_INVALID: &str = "REFRESH_TOKEN_INVALID";
pub const REFRESH_TOKEN_IS_USED_OR_NOT_EXIST: &str = "REFRESH_TOKEN_IS_USED_OR_NOT_EXIST";

pub const EMAIL_VERIFY_TOKEN_IS_REQUIRED: &str = "EMAIL_VERIFY_TOKEN_IS_REQUIRED";
pub const EMAIL_VERIFY_TOKEN_INVALID: &str = "EMAIL_VERIFY_TOKEN_INVALID";
pub const EMAIL_VERIFY_SUCCESS: &str = "EMAIL_VERIFY_SUCCESS";
pub const EMAIL_ALREADY_VERIFIED_BEFORE: &str = "EMAIL_ALREADY_VERIFIED_BEFORE";
pub const RESEND_VERIFY_EMAIL_SUCCESS: &str = "RESEND_VERIFY_EMAIL_SUCCESS";

pub const FORGOT_PASSWORD_TOKEN_IS_REQUIRED: &str = "FORGOT_PASSWORD_TOKEN_IS_REQUIRED";
pub const FORGOT_PASSWORD_TOKEN_IS_INVALID: &str = "FORGOT_PASSWORD_TOKEN_IS_INVALID";
pub const CHECK_EMAIL_TO_RESET_PASSWORD: &str = "CHECK_EMAIL_TO_RESET_PASSWORD";
pub const VERIFY_FORGOT_PASSWORD_SUCCESS: &str = "VERIFY_FORGOT_PASSWORD_SUCCESS";
pub const RESET_PASSWORD_SUCCESS: &str = "RESET_PASSWORD_SUCCESS";

pub const REGISTER_SUCCESS: &str = "REGISTER_SUCCESS";
pub const LOGIN_SUCCESS: &str = "LOGIN_SUCCESS";
pub const LOGOUT_SUCCESS: &str = "LOGOUT_SUCCESS";
pub const REFRESH_TOKEN_SUCCESS: &str = "REFRESH_TOKEN_SUCCESS";
