//! How an object is represented in the response, decided from its suffix.

/// Whether the client should render the body or save it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Inline,
    Attachment,
}

/// Encoding applied to the envelope body (not HTTP chunked encoding).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEncoding {
    /// Body is the object's UTF-8 text.
    Identity,
    /// Body is the standard base64 encoding of the object's bytes.
    Base64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentPlan {
    pub content_type: String,
    pub disposition: Disposition,
    /// Final path segment; sent in `Content-Disposition` for attachments.
    pub filename: String,
    pub transfer_encoding: TransferEncoding,
}
