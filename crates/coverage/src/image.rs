use bytes::Bytes;

/// Server-rendered raster returned by the render service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    bytes: Bytes,
}

impl RenderedImage {
    pub fn new(bytes: Bytes) -> Self {
        Self { bytes }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Identifies one refresh of an image slot.
///
/// Tokens are monotonically increasing per slot, so a response can be
/// matched against the newest request and late arrivals discarded.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

/// Result of offering an image to a slot.
#[derive(Debug, PartialEq, Eq)]
pub enum Install {
    /// The image is now displayed; the displaced one is handed back for
    /// release.
    Displayed { replaced: Option<RenderedImage> },
    /// The token was superseded while the fetch was in flight; the slot is
    /// untouched and the offered image is handed back.
    Stale(RenderedImage),
}

/// Holds at most one live image for a logical display slot.
///
/// Replacing or clearing hands the previous image back to the caller, so
/// exactly one rendered image per slot is ever live.
#[derive(Debug, Default)]
pub struct ImageSlot {
    current: Option<RenderedImage>,
    newest_token: u64,
}

impl ImageSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn image(&self) -> Option<&RenderedImage> {
        self.current.as_ref()
    }

    /// Marks the start of a refresh and returns its token.
    ///
    /// Issuing a new token supersedes every token issued before it.
    pub fn begin_request(&mut self) -> RequestToken {
        self.newest_token += 1;
        RequestToken(self.newest_token)
    }

    /// Offers a fetched image under the token its request was issued with.
    pub fn install(&mut self, token: RequestToken, image: RenderedImage) -> Install {
        if token.0 != self.newest_token {
            return Install::Stale(image);
        }
        let replaced = self.current.replace(image);
        Install::Displayed { replaced }
    }

    /// Empties the slot, handing back the released image if one was live.
    ///
    /// Clearing also supersedes in-flight requests, so a response from
    /// before the clear cannot repopulate the slot.
    pub fn clear(&mut self) -> Option<RenderedImage> {
        self.newest_token += 1;
        self.current.take()
    }
}
