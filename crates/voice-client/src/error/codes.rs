//! Closed table of coded domain errors
//!
//! The table below is the compiled form of the versioned error-code data
//! published for the native voice transport. Each entry becomes one
//! [`ErrorCode`] variant; its name, description, explanation, causes and
//! solutions are fixed data of the variant and never depend on the message
//! a failure was reported with.
//!
//! # Examples
//!
//! ```rust
//! use rvoip_voice_client::error::{ErrorCategory, ErrorCode};
//!
//! let code = ErrorCode::from_code(20101).unwrap();
//! assert_eq!(code, ErrorCode::AccessTokenInvalid);
//! assert_eq!(code.name(), "AccessTokenInvalid");
//! assert_eq!(code.category(), ErrorCategory::Authorization);
//! assert!(ErrorCode::from_code(12345).is_none());
//! ```

use serde::{Deserialize, Serialize};

/// Version of the error-code data this table was generated from
pub const ERROR_TABLE_VERSION: &str = "2024.1";

/// Family a coded error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// Access token and authentication failures
    Authorization,
    /// Catch-all transport and connection failures
    General,
    /// Requests the server could not parse
    MalformedRequest,
    /// Call message failures
    CallMessage,
    /// Push registration failures
    Registration,
    /// 4xx-style failures reported by the signaling server
    Client,
    /// 5xx-style failures reported by the signaling server
    Server,
    /// 6xx-style global failures
    SipServer,
    /// Signaling channel failures
    Signaling,
    /// Media negotiation and transport failures
    Media,
}

macro_rules! error_codes {
    (
        $(
            $code:literal => $variant:ident {
                category: $category:ident,
                description: $description:literal,
                explanation: $explanation:literal,
                causes: [$($cause:literal),* $(,)?],
                solutions: [$($solution:literal),* $(,)?] $(,)?
            }
        ),* $(,)?
    ) => {
        /// Every numeric error code known to this build
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum ErrorCode {
            $(
                #[doc = $description]
                $variant,
            )*
        }

        impl ErrorCode {
            /// All known codes, in table order
            pub const ALL: &'static [ErrorCode] = &[$(ErrorCode::$variant),*];

            /// Look up the variant registered for a numeric code
            pub fn from_code(code: u32) -> Option<Self> {
                match code {
                    $($code => Some(ErrorCode::$variant),)*
                    _ => None,
                }
            }

            /// Numeric code of this variant
            pub fn code(&self) -> u32 {
                match self {
                    $(ErrorCode::$variant => $code,)*
                }
            }

            /// Stable error name
            pub fn name(&self) -> &'static str {
                match self {
                    $(ErrorCode::$variant => stringify!($variant),)*
                }
            }

            /// Family this code belongs to
            pub fn category(&self) -> ErrorCategory {
                match self {
                    $(ErrorCode::$variant => ErrorCategory::$category,)*
                }
            }

            /// One-line human description
            pub fn description(&self) -> &'static str {
                match self {
                    $(ErrorCode::$variant => $description,)*
                }
            }

            /// Longer explanation of what went wrong
            pub fn explanation(&self) -> &'static str {
                match self {
                    $(ErrorCode::$variant => $explanation,)*
                }
            }

            /// Likely causes, most likely first
            pub fn causes(&self) -> &'static [&'static str] {
                match self {
                    $(ErrorCode::$variant => &[$($cause),*],)*
                }
            }

            /// Suggested solutions, in the order they should be tried
            pub fn solutions(&self) -> &'static [&'static str] {
                match self {
                    $(ErrorCode::$variant => &[$($solution),*],)*
                }
            }
        }
    };
}

error_codes! {
    20101 => AccessTokenInvalid {
        category: Authorization,
        description: "Invalid access token",
        explanation: "The server was unable to validate the access token.",
        causes: [],
        solutions: ["Check that the access token is signed with the correct key and has not been modified."],
    },
    20102 => AccessTokenHeaderInvalid {
        category: Authorization,
        description: "Invalid access token header",
        explanation: "The header of the access token could not be parsed.",
        causes: ["The token was truncated or is not a JWT."],
        solutions: ["Generate the access token with an up to date helper library."],
    },
    20103 => AccessTokenIssuerInvalid {
        category: Authorization,
        description: "Invalid access token issuer or subject",
        explanation: "The issuer or subject of the access token does not match an account.",
        causes: ["The signing key belongs to a different account."],
        solutions: ["Create the access token with the API key of the account placing the call."],
    },
    20104 => AccessTokenExpired {
        category: Authorization,
        description: "Access token expired or expiration date invalid",
        explanation: "The access token provided has expired, the expiration time is in the past, or the expiration time is invalid.",
        causes: [
            "The access token was used after its expiration time.",
            "The clock of the machine that generated the token is skewed.",
        ],
        solutions: [
            "Fetch a new access token before the current one expires.",
            "Synchronize the clock of the token server.",
        ],
    },
    20105 => AccessTokenNotYetValid {
        category: Authorization,
        description: "Access token not yet valid",
        explanation: "The access token has a not-before time in the future.",
        causes: ["The clock of the machine that generated the token is ahead."],
        solutions: ["Synchronize the clock of the token server."],
    },
    20106 => AccessTokenGrantsInvalid {
        category: Authorization,
        description: "Invalid access token grants",
        explanation: "The grants of the access token are missing or malformed.",
        causes: ["The token does not carry a voice grant."],
        solutions: ["Add a voice grant to the access token."],
    },
    20107 => AccessTokenSignatureInvalid {
        category: Authorization,
        description: "Invalid access token signature",
        explanation: "The signature of the access token could not be verified.",
        causes: ["The token was signed with the wrong secret."],
        solutions: ["Sign the access token with the secret of the API key it names."],
    },
    20151 => AuthenticationFailed {
        category: Authorization,
        description: "Authentication failed",
        explanation: "The authentication with the provided JWT failed.",
        causes: [],
        solutions: [],
    },
    20157 => ExpirationTimeExceedsMaxTimeAllowed {
        category: Authorization,
        description: "Expiration time exceeds maximum time allowed",
        explanation: "The expiration time of the access token is further in the future than the allowed maximum of 24 hours.",
        causes: [],
        solutions: ["Issue access tokens with a time to live of at most 24 hours."],
    },
    31000 => UnknownError {
        category: General,
        description: "Unknown error",
        explanation: "An unknown error has occurred.",
        causes: [],
        solutions: [],
    },
    31005 => ConnectionError {
        category: General,
        description: "Connection error",
        explanation: "A connection error occurred during the call.",
        causes: ["The network connection dropped while the call was being set up."],
        solutions: ["Retry the call once connectivity is restored."],
    },
    31008 => CallCancelledError {
        category: General,
        description: "Call cancelled",
        explanation: "Unable to answer because the call has ended.",
        causes: ["The call was cancelled by the caller before it was accepted."],
        solutions: [],
    },
    31009 => TransportError {
        category: General,
        description: "Transport error",
        explanation: "No transport available to send or receive messages.",
        causes: ["The signaling socket is not connected."],
        solutions: ["Check the network connection and retry."],
    },
    31100 => MalformedRequestError {
        category: MalformedRequest,
        description: "The request had malformed syntax",
        explanation: "The request could not be understood due to malformed syntax.",
        causes: [
            "Invalid content or message type.",
            "The request body was not valid JSON.",
        ],
        solutions: ["Ensure the request is well formed."],
    },
    31101 => MissingParameterArrayError {
        category: MalformedRequest,
        description: "Missing parameter array in request",
        explanation: "The parameter array was missing from the request.",
        causes: [],
        solutions: [],
    },
    31102 => AuthorizationTokenMissingError {
        category: MalformedRequest,
        description: "Authorization token missing in request",
        explanation: "The request did not carry an authorization token.",
        causes: [],
        solutions: ["Provide an access token when connecting or registering."],
    },
    31103 => MaxParameterLengthExceededError {
        category: MalformedRequest,
        description: "Maximum parameter length has been exceeded",
        explanation: "A parameter in the request exceeds the maximum allowed length.",
        causes: [],
        solutions: ["Shorten the custom parameters sent with the call."],
    },
    31104 => InvalidBridgeTokenError {
        category: MalformedRequest,
        description: "Invalid bridge token",
        explanation: "The bridge token used to reconnect the call is invalid.",
        causes: [],
        solutions: [],
    },
    31105 => InvalidClientNameError {
        category: MalformedRequest,
        description: "Invalid client name",
        explanation: "The client name contains invalid characters.",
        causes: ["The identity used in the access token contains unsupported characters."],
        solutions: ["Only use alphanumeric characters and underscores in client names."],
    },
    31107 => ReconnectParameterInvalidError {
        category: MalformedRequest,
        description: "The reconnect parameter is invalid",
        explanation: "The reconnect parameter supplied for the call is invalid.",
        causes: [],
        solutions: [],
    },
    31201 => AuthorizationError {
        category: Authorization,
        description: "Authorization error",
        explanation: "The request requires user authentication. The server understood the request, but is refusing to fulfill it.",
        causes: [],
        solutions: [],
    },
    31210 => CallMessageEventTypeInvalidError {
        category: CallMessage,
        description: "Call message event type is invalid",
        explanation: "The message type of the call message is not supported.",
        causes: ["The message type is not one the server accepts."],
        solutions: ["Use a supported message type such as \"user-defined-message\"."],
    },
    31211 => CallMessageUnexpectedStateError {
        category: CallMessage,
        description: "Call is not in the expected state",
        explanation: "A call message was sent while the call was not connected.",
        causes: ["The message was sent before the call connected or after it disconnected."],
        solutions: ["Only send call messages while the call is connected."],
    },
    31212 => PayloadSizeExceededError {
        category: CallMessage,
        description: "Call message payload size exceeded",
        explanation: "The payload of the call message exceeds the allowed size.",
        causes: ["The content is larger than 10 kilobytes."],
        solutions: ["Send smaller messages or split the content."],
    },
    31301 => RegistrationError {
        category: Registration,
        description: "Registration error",
        explanation: "Registration of the device for incoming calls failed.",
        causes: [],
        solutions: [],
    },
    31302 => UnsupportedCancelMessageError {
        category: Registration,
        description: "Unsupported cancel message error",
        explanation: "The cancel message received for a call invite is not supported by this version.",
        causes: [],
        solutions: ["Upgrade to a release that supports the cancel message format."],
    },
    31400 => BadRequest {
        category: Client,
        description: "Bad request",
        explanation: "The request could not be understood due to malformed syntax.",
        causes: [],
        solutions: [],
    },
    31403 => Forbidden {
        category: Client,
        description: "Forbidden",
        explanation: "The server understood the request, but is refusing to fulfill it.",
        causes: [],
        solutions: [],
    },
    31404 => NotFound {
        category: Client,
        description: "Not found",
        explanation: "The server has not found anything matching the request.",
        causes: ["The dialled destination does not exist."],
        solutions: ["Check the destination address."],
    },
    31408 => RequestTimeout {
        category: Client,
        description: "Request timeout",
        explanation: "A request timeout occurred.",
        causes: [],
        solutions: [],
    },
    31409 => Conflict {
        category: Client,
        description: "Conflict",
        explanation: "The request could not be processed because of a conflict in the current state of the resource.",
        causes: [],
        solutions: [],
    },
    31426 => UpgradeRequired {
        category: Client,
        description: "Upgrade required",
        explanation: "This error is raised when an HTTP 426 response is received.",
        causes: ["The client is too old to talk to the signaling server."],
        solutions: ["Upgrade the client."],
    },
    31429 => TooManyRequests {
        category: Client,
        description: "Too many requests",
        explanation: "Too many requests were sent in a given amount of time.",
        causes: ["Rate limit exceeded."],
        solutions: ["Wait before sending further requests."],
    },
    31480 => TemporarilyUnavailable {
        category: Client,
        description: "Temporarily unavailable",
        explanation: "The callee is currently unavailable.",
        causes: [],
        solutions: [],
    },
    31481 => CallTransactionDoesNotExist {
        category: Client,
        description: "Call or transaction does not exist",
        explanation: "The call no longer exists on the server.",
        causes: [],
        solutions: [],
    },
    31484 => AddressIncomplete {
        category: Client,
        description: "Address incomplete",
        explanation: "The provided phone number is malformed.",
        causes: [],
        solutions: [],
    },
    31486 => BusyHere {
        category: Client,
        description: "Busy here",
        explanation: "The callee is busy.",
        causes: [],
        solutions: [],
    },
    31487 => RequestTerminated {
        category: Client,
        description: "Request terminated",
        explanation: "The request has terminated as a result of a bye or cancel.",
        causes: [],
        solutions: [],
    },
    31500 => InternalServerError {
        category: Server,
        description: "Internal server error",
        explanation: "The server could not complete the request due to an unexpected condition.",
        causes: [],
        solutions: [],
    },
    31502 => BadGateway {
        category: Server,
        description: "Bad gateway",
        explanation: "The server is acting as a gateway and received an invalid response from a downstream server.",
        causes: [],
        solutions: [],
    },
    31503 => ServiceUnavailable {
        category: Server,
        description: "Service unavailable",
        explanation: "The server is temporarily unable to handle the request.",
        causes: [],
        solutions: ["Retry the request later."],
    },
    31504 => GatewayTimeout {
        category: Server,
        description: "Gateway timeout",
        explanation: "The server did not receive a timely response from a downstream server.",
        causes: [],
        solutions: [],
    },
    31530 => DnsResolutionError {
        category: Server,
        description: "DNS resolution error",
        explanation: "Could not connect to the server because the host could not be resolved.",
        causes: ["The DNS server is unreachable or returned no record."],
        solutions: ["Check the network and DNS configuration of the device."],
    },
    31600 => BusyEverywhere {
        category: SipServer,
        description: "Busy everywhere",
        explanation: "All possible destinations are busy.",
        causes: [],
        solutions: [],
    },
    31603 => Decline {
        category: SipServer,
        description: "Decline",
        explanation: "The callee does not wish to participate in the call.",
        causes: [],
        solutions: [],
    },
    31604 => DoesNotExistAnywhere {
        category: SipServer,
        description: "Does not exist anywhere",
        explanation: "The requested callee does not exist anywhere.",
        causes: [],
        solutions: [],
    },
    53000 => SignalingConnectionError {
        category: Signaling,
        description: "Signaling connection error",
        explanation: "Raised whenever a signaling connection error occurs that is not covered by a more specific error code.",
        causes: [
            "The device is offline.",
            "A firewall blocks the signaling endpoint.",
        ],
        solutions: ["Check the network connection and firewall rules."],
    },
    53001 => SignalingConnectionDisconnected {
        category: Signaling,
        description: "Signaling connection disconnected",
        explanation: "Raised whenever the signaling connection is unexpectedly disconnected.",
        causes: ["The network connection dropped mid-call."],
        solutions: ["Ensure the device has a stable network connection."],
    },
    53405 => MediaConnectionError {
        category: Media,
        description: "Media connection failed",
        explanation: "Raised by the client when the media connection fails.",
        causes: ["No ICE candidate pair could be established."],
        solutions: ["Check the NAT and firewall configuration of the network."],
    },
    53407 => MediaDtlsTransportFailedError {
        category: Media,
        description: "Media connection failed due to DTLS handshake failure",
        explanation: "There was a problem while negotiating with the remote DTLS peer.",
        causes: ["The remote certificate could not be verified."],
        solutions: ["Ensure the device clock is correct."],
    },
}
