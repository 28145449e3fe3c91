//! Domain types for the registration core.
//!
//! Value objects (identifiers, money, dates), the `Event`/`TicketType`/
//! `Registration` entities, and the typed payment-method union live here.
//! Counters on `Event` and `TicketType` are only ever mutated through the
//! store's commit path; everything else treats them as read-only snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for an event
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(Uuid);

impl EventId {
    /// Creates a new random `EventId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an `EventId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a user (attendee or organizer)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new random `UserId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `UserId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a registration
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegistrationId(Uuid);

impl RegistrationId {
    /// Creates a new random `RegistrationId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `RegistrationId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RegistrationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Money Value Object (cents-based to avoid floating point errors)
// ============================================================================

/// Represents money in cents to avoid floating-point arithmetic errors
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Money(u64);

impl Money {
    /// The zero amount (free tickets)
    pub const ZERO: Self = Self(0);

    /// Creates a `Money` value from cents
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Creates a `Money` value from dollars with overflow checking
    #[must_use]
    pub const fn checked_from_dollars(dollars: u64) -> Option<Self> {
        match dollars.checked_mul(100) {
            Some(cents) => Some(Self(cents)),
            None => None,
        }
    }

    /// Creates a `Money` value from dollars
    ///
    /// # Panics
    ///
    /// Panics if the conversion would overflow (dollars * 100 > `u64::MAX`).
    /// Use `checked_from_dollars` for non-panicking conversion.
    #[must_use]
    #[allow(clippy::panic)]
    pub const fn from_dollars(dollars: u64) -> Self {
        match Self::checked_from_dollars(dollars) {
            Some(money) => money,
            None => panic!("Money::from_dollars overflow"),
        }
    }

    /// Returns the amount in cents
    #[must_use]
    pub const fn cents(&self) -> u64 {
        self.0
    }

    /// Returns the amount in dollars (rounded down)
    #[must_use]
    pub const fn dollars(&self) -> u64 {
        self.0 / 100
    }

    /// Checks if the amount is zero
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Adds two money amounts with overflow checking
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(result) => Some(Self(result)),
            None => None,
        }
    }

    /// Adds two money amounts, saturating at the representable maximum
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.dollars(), self.0 % 100)
    }
}

// ============================================================================
// Time and Capacity Value Objects
// ============================================================================

/// Wrapper for event date with ordering and comparison
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventDate(DateTime<Utc>);

impl EventDate {
    /// Creates a new `EventDate`
    #[must_use]
    pub const fn new(date: DateTime<Utc>) -> Self {
        Self(date)
    }

    /// Returns the inner `DateTime`
    #[must_use]
    pub const fn inner(&self) -> DateTime<Utc> {
        self.0
    }

    /// Checks whether the event date is no longer strictly in the future
    #[must_use]
    pub fn has_passed(&self, now: DateTime<Utc>) -> bool {
        self.0 <= now
    }
}

impl fmt::Display for EventDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M UTC"))
    }
}

/// Represents total admission capacity for an event
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Capacity(u32);

impl Capacity {
    /// Creates a new `Capacity`
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the capacity value
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Event and Ticket Tiers
// ============================================================================

/// Event lifecycle status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    /// Open for registration
    Active,
    /// Cancelled by the organizer; no further registrations
    Cancelled,
    /// Took place; kept for historical reporting
    Completed,
}

impl EventStatus {
    /// Checks whether registrations may proceed
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// A named category of ticket with its own price and inventory.
///
/// Tiers are embedded in their event and looked up by name; they are created
/// with the event and never deleted while registrations reference them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketType {
    /// Tier name, unique within the event (the lookup key)
    pub name: String,
    /// Price per unit
    pub price: Money,
    /// Total inventory for this tier
    pub available: u32,
    /// Units reserved so far
    pub sold: u32,
}

impl TicketType {
    /// Creates a new tier with nothing sold
    #[must_use]
    pub const fn new(name: String, price: Money, available: u32) -> Self {
        Self {
            name,
            price,
            available,
            sold: 0,
        }
    }

    /// Returns the number of unsold units
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.available.saturating_sub(self.sold)
    }

    /// Checks whether every unit has been sold
    #[must_use]
    pub const fn is_sold_out(&self) -> bool {
        self.sold >= self.available
    }
}

/// Event entity owning its ticket tiers and aggregate counters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Unique event identifier
    pub id: EventId,
    /// Organizer who created the event
    pub creator_id: UserId,
    /// Event name
    pub name: String,
    /// When the event takes place
    pub date: EventDate,
    /// Total admission capacity across all tiers
    pub capacity: Capacity,
    /// Aggregate count of reserved capacity units
    pub booked: u32,
    /// Current lifecycle status
    pub status: EventStatus,
    /// Ticket tiers, ordered as supplied at creation
    pub tickets: Vec<TicketType>,
    /// When the event was created
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Creates a new active event with nothing booked
    #[must_use]
    pub const fn new(
        id: EventId,
        creator_id: UserId,
        name: String,
        date: EventDate,
        capacity: Capacity,
        tickets: Vec<TicketType>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            creator_id,
            name,
            date,
            capacity,
            booked: 0,
            status: EventStatus::Active,
            tickets,
            created_at,
        }
    }

    /// Returns the number of unreserved capacity units
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.capacity.value().saturating_sub(self.booked)
    }

    /// Checks whether every capacity unit has been reserved
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.booked >= self.capacity.value()
    }
}

// ============================================================================
// Payment
// ============================================================================

/// How the attendee intends to pay, with the details each method requires.
///
/// A typed union instead of an open map so malformed detail bags are rejected
/// at the boundary rather than deep in the service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Direct bank transfer
    BankTransfer {
        /// Receiving bank name
        bank_name: String,
        /// Account number the transfer is sent to
        account_number: String,
    },
    /// Cash App transfer
    CashApp {
        /// Cash App username ($cashtag)
        username: String,
    },
    /// Cash at the door
    Cash,
}

impl PaymentMethod {
    /// Stable label used for grouping in analytics breakdowns
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::BankTransfer { .. } => "bank_transfer",
            Self::CashApp { .. } => "cash_app",
            Self::Cash => "cash",
        }
    }
}

/// Payment lifecycle status of a registration
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Awaiting payment
    Pending,
    /// Payment received
    Paid,
    /// Payment returned; terminal
    Refunded,
}

impl PaymentStatus {
    /// Stable label used for grouping in analytics breakdowns
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Refunded => "refunded",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Payment details carried by a registration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Chosen payment method and its details
    pub method: PaymentMethod,
    /// Current payment status
    pub status: PaymentStatus,
    /// When the payment was confirmed (set on entry into `Paid`)
    pub paid_at: Option<DateTime<Utc>>,
    /// External transaction identifier, if reported
    pub transaction_id: Option<String>,
    /// Free-form payment reference, if reported
    pub payment_reference: Option<String>,
}

impl PaymentRecord {
    /// Creates a record in the given status with no confirmation metadata
    #[must_use]
    pub const fn new(method: PaymentMethod, status: PaymentStatus) -> Self {
        Self {
            method,
            status,
            paid_at: None,
            transaction_id: None,
            payment_reference: None,
        }
    }
}

/// Optional confirmation metadata merged into a [`PaymentRecord`] on a
/// status transition. Absent fields leave stored values untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentUpdate {
    /// External transaction identifier
    pub transaction_id: Option<String>,
    /// Free-form payment reference
    pub payment_reference: Option<String>,
}

// ============================================================================
// Registration
// ============================================================================

/// Contact details captured at registration time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    /// Attendee display name
    pub name: String,
    /// Attendee email
    pub email: String,
    /// Attendee phone number, if supplied
    pub phone: Option<String>,
}

/// The record binding one user to one event at one tier.
///
/// `ticket_price` is a snapshot of the tier price at registration time and
/// never changes afterwards, even if the tier is repriced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    /// Unique registration identifier
    pub id: RegistrationId,
    /// Event being attended
    pub event_id: EventId,
    /// Attendee; unique together with `event_id`
    pub user_id: UserId,
    /// Name of the reserved tier
    pub ticket_type: String,
    /// Tier price at registration time
    pub ticket_price: Money,
    /// Attendee contact details
    pub contact: ContactInfo,
    /// Payment method, status, and confirmation metadata
    pub payment: PaymentRecord,
    /// When the registration was created
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Identity (supplied by the external identity collaborator)
// ============================================================================

/// Role attached to an authenticated caller
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular attendee
    User,
    /// Can publish and manage own events
    Organizer,
    /// Full access
    Admin,
}

impl Role {
    /// Checks for elevated (admin) privilege
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Checks whether the caller may publish events
    #[must_use]
    pub const fn can_publish(&self) -> bool {
        matches!(self, Self::Organizer | Self::Admin)
    }
}

impl std::str::FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "organizer" => Ok(Self::Organizer),
            "admin" => Ok(Self::Admin),
            _ => Err(()),
        }
    }
}

/// Authenticated caller as supplied by the external identity collaborator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    /// Caller's user id
    pub user_id: UserId,
    /// Caller's display name
    pub name: String,
    /// Caller's email
    pub email: String,
    /// Caller's role
    pub role: Role,
}

// ============================================================================
// Commands (service inputs)
// ============================================================================

/// Tier description supplied when publishing an event.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NewTicketType {
    /// Tier name, unique within the event
    pub name: String,
    /// Price per unit
    pub price: Money,
    /// Total inventory for this tier
    pub available: u32,
}

/// Event description supplied when publishing an event.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NewEvent {
    /// Event name
    pub name: String,
    /// When the event takes place
    pub date: EventDate,
    /// Total admission capacity
    pub capacity: Capacity,
    /// Ticket tiers on offer
    pub tickets: Vec<NewTicketType>,
}

/// Registration request as received from the attendee.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NewRegistration {
    /// Event to register for
    pub event_id: EventId,
    /// Name of the tier to reserve
    pub ticket_type: String,
    /// Payment method and details
    pub payment_method: PaymentMethod,
    /// Attendee phone number, if supplied
    pub phone: Option<String>,
}
