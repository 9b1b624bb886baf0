//! Unified error codes for the POS backend
//!
//! Error codes are shared by pos-server and its clients (waiter tablets,
//! kitchen displays). They are organized by category:
//! - 0xxx: General errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Menu errors
//! - 7xxx: Table errors
//! - 8xxx: Kitchen errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order has already been paid
    OrderAlreadyPaid = 4002,
    /// Order no longer accepts changes
    OrderNotOpen = 4003,
    /// Order line not found
    OrderLineNotFound = 4004,
    /// Order line has already left the pending state
    OrderLineNotPending = 4005,
    /// Order has no pending lines to dispatch
    NoPendingItems = 4006,

    // ==================== 5xxx: Payment ====================
    /// Tendered amount is below the amount due
    InsufficientPayment = 5001,
    /// Payment method not found or inactive
    InvalidPaymentMethod = 5002,
    /// Payment record not found
    PaymentNotFound = 5003,
    /// Split bill request is invalid
    InvalidSplit = 5004,
    /// Discount request is invalid
    InvalidDiscount = 5005,

    // ==================== 6xxx: Menu ====================
    /// Menu item not found
    MenuItemNotFound = 6001,
    /// Menu item is currently unavailable
    MenuItemNotAvailable = 6002,

    // ==================== 7xxx: Table ====================
    /// Table not found
    TableNotFound = 7001,
    /// Table must be cleaned before a new order
    TableNeedsCleaning = 7002,
    /// Table is occupied by an unsettled order
    TableOccupied = 7003,
    /// Requested table status is not allowed
    InvalidTableStatus = 7004,

    // ==================== 8xxx: Kitchen ====================
    /// Kitchen ticket not found
    KitchenItemNotFound = 8001,
    /// Ticket status transition is not allowed
    InvalidStatusTransition = 8002,
    /// Kitchen area not found
    KitchenAreaNotFound = 8003,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9003,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Stable upper-snake name, as clients match on it
    pub const fn name(&self) -> &'static str {
        match self {
            ErrorCode::Success => "SUCCESS",
            ErrorCode::Unknown => "UNKNOWN",
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::AlreadyExists => "ALREADY_EXISTS",
            ErrorCode::InvalidRequest => "INVALID_REQUEST",
            ErrorCode::ValueOutOfRange => "VALUE_OUT_OF_RANGE",

            ErrorCode::OrderNotFound => "ORDER_NOT_FOUND",
            ErrorCode::OrderAlreadyPaid => "ORDER_ALREADY_PAID",
            ErrorCode::OrderNotOpen => "ORDER_NOT_OPEN",
            ErrorCode::OrderLineNotFound => "ORDER_LINE_NOT_FOUND",
            ErrorCode::OrderLineNotPending => "ORDER_LINE_NOT_PENDING",
            ErrorCode::NoPendingItems => "NO_PENDING_ITEMS",

            ErrorCode::InsufficientPayment => "INSUFFICIENT_PAYMENT",
            ErrorCode::InvalidPaymentMethod => "INVALID_PAYMENT_METHOD",
            ErrorCode::PaymentNotFound => "PAYMENT_NOT_FOUND",
            ErrorCode::InvalidSplit => "INVALID_SPLIT",
            ErrorCode::InvalidDiscount => "INVALID_DISCOUNT",

            ErrorCode::MenuItemNotFound => "MENU_ITEM_NOT_FOUND",
            ErrorCode::MenuItemNotAvailable => "MENU_ITEM_NOT_AVAILABLE",

            ErrorCode::TableNotFound => "TABLE_NOT_FOUND",
            ErrorCode::TableNeedsCleaning => "TABLE_NEEDS_CLEANING",
            ErrorCode::TableOccupied => "TABLE_OCCUPIED",
            ErrorCode::InvalidTableStatus => "INVALID_TABLE_STATUS",

            ErrorCode::KitchenItemNotFound => "KITCHEN_ITEM_NOT_FOUND",
            ErrorCode::InvalidStatusTransition => "INVALID_STATUS_TRANSITION",
            ErrorCode::KitchenAreaNotFound => "KITCHEN_AREA_NOT_FOUND",

            ErrorCode::InternalError => "INTERNAL_ERROR",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::ConfigError => "CONFIG_ERROR",
        }
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderAlreadyPaid => "Order has already been paid",
            ErrorCode::OrderNotOpen => "Order no longer accepts changes",
            ErrorCode::OrderLineNotFound => "Order line not found",
            ErrorCode::OrderLineNotPending => "Order line has already been sent to the kitchen",
            ErrorCode::NoPendingItems => "No pending items to send to the kitchen",

            // Payment
            ErrorCode::InsufficientPayment => "Payment amount is insufficient",
            ErrorCode::InvalidPaymentMethod => "Payment method not found or inactive",
            ErrorCode::PaymentNotFound => "Payment not found",
            ErrorCode::InvalidSplit => "Invalid split bill request",
            ErrorCode::InvalidDiscount => "Invalid discount",

            // Menu
            ErrorCode::MenuItemNotFound => "Menu item not found",
            ErrorCode::MenuItemNotAvailable => "Menu item is not available",

            // Table
            ErrorCode::TableNotFound => "Table not found",
            ErrorCode::TableNeedsCleaning => "Table needs cleaning before a new order",
            ErrorCode::TableOccupied => "Table is occupied by an unsettled order",
            ErrorCode::InvalidTableStatus => "Table status change is not allowed",

            // Kitchen
            ErrorCode::KitchenItemNotFound => "Kitchen item not found",
            ErrorCode::InvalidStatusTransition => "Invalid status transition",
            ErrorCode::KitchenAreaNotFound => "Kitchen area not found",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderAlreadyPaid),
            4003 => Ok(ErrorCode::OrderNotOpen),
            4004 => Ok(ErrorCode::OrderLineNotFound),
            4005 => Ok(ErrorCode::OrderLineNotPending),
            4006 => Ok(ErrorCode::NoPendingItems),

            // Payment
            5001 => Ok(ErrorCode::InsufficientPayment),
            5002 => Ok(ErrorCode::InvalidPaymentMethod),
            5003 => Ok(ErrorCode::PaymentNotFound),
            5004 => Ok(ErrorCode::InvalidSplit),
            5005 => Ok(ErrorCode::InvalidDiscount),

            // Menu
            6001 => Ok(ErrorCode::MenuItemNotFound),
            6002 => Ok(ErrorCode::MenuItemNotAvailable),

            // Table
            7001 => Ok(ErrorCode::TableNotFound),
            7002 => Ok(ErrorCode::TableNeedsCleaning),
            7003 => Ok(ErrorCode::TableOccupied),
            7004 => Ok(ErrorCode::InvalidTableStatus),

            // Kitchen
            8001 => Ok(ErrorCode::KitchenItemNotFound),
            8002 => Ok(ErrorCode::InvalidStatusTransition),
            8003 => Ok(ErrorCode::KitchenAreaNotFound),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ErrorCode; 30] = [
        ErrorCode::Success,
        ErrorCode::Unknown,
        ErrorCode::ValidationFailed,
        ErrorCode::NotFound,
        ErrorCode::AlreadyExists,
        ErrorCode::InvalidRequest,
        ErrorCode::ValueOutOfRange,
        ErrorCode::OrderNotFound,
        ErrorCode::OrderAlreadyPaid,
        ErrorCode::OrderNotOpen,
        ErrorCode::OrderLineNotFound,
        ErrorCode::OrderLineNotPending,
        ErrorCode::NoPendingItems,
        ErrorCode::InsufficientPayment,
        ErrorCode::InvalidPaymentMethod,
        ErrorCode::PaymentNotFound,
        ErrorCode::InvalidSplit,
        ErrorCode::InvalidDiscount,
        ErrorCode::MenuItemNotFound,
        ErrorCode::MenuItemNotAvailable,
        ErrorCode::TableNotFound,
        ErrorCode::TableNeedsCleaning,
        ErrorCode::TableOccupied,
        ErrorCode::InvalidTableStatus,
        ErrorCode::KitchenItemNotFound,
        ErrorCode::InvalidStatusTransition,
        ErrorCode::KitchenAreaNotFound,
        ErrorCode::InternalError,
        ErrorCode::DatabaseError,
        ErrorCode::ConfigError,
    ];

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::OrderNotFound.code(), 4001);
        assert_eq!(ErrorCode::InsufficientPayment.code(), 5001);
        assert_eq!(ErrorCode::MenuItemNotAvailable.code(), 6002);
        assert_eq!(ErrorCode::TableNeedsCleaning.code(), 7002);
        assert_eq!(ErrorCode::InvalidStatusTransition.code(), 8002);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
    }

    #[test]
    fn test_every_code_converts_back() {
        for code in ALL {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        assert_eq!(ErrorCode::try_from(4999), Err(InvalidErrorCode(4999)));
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_string(&ErrorCode::OrderAlreadyPaid).unwrap();
        assert_eq!(json, "4002");
    }

    #[test]
    fn test_deserialize() {
        let code: ErrorCode = serde_json::from_str("8002").unwrap();
        assert_eq!(code, ErrorCode::InvalidStatusTransition);

        let result: Result<ErrorCode, _> = serde_json::from_str("10000");
        assert!(result.is_err());
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<&str> = ALL.iter().map(|c| c.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ALL.len());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ErrorCode::NoPendingItems), "4006");
        assert_eq!(ErrorCode::NoPendingItems.name(), "NO_PENDING_ITEMS");
    }
}
