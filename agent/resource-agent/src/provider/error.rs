use std::fmt::{Display, Formatter};

/// When a [`ResourcePreparer`] operation returns an error, it must explicitly state whether or not
/// it has left resources behind.
#[derive(Copy, Clone, Debug)]
pub enum Resources {
    /// An error occurred and the preparer left resources behind that it can never find again, for
    /// example a role created under a name that was not recorded. Someone has to clean these up
    /// by hand.
    Orphaned,

    /// An error occurred and resources were left behind. Teardown can destroy them.
    Remaining,

    /// Something bad happened, but no resources were left behind.
    Clear,

    /// The preparer does not know whether or not there are resources remaining. Teardown should
    /// try.
    Unknown,
}

/// The error type returned by [`ResourcePreparer`] implementations.
#[derive(Debug)]
pub struct ProviderError {
    /// Whether or not the error has left resources behind.
    resources: Resources,

    /// Any message to be included with the error. This will be included in the formatted display
    /// before `inner`.
    context: Option<String>,

    /// The error that caused this error.
    inner: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

/// The result type returned by [`ResourcePreparer`] operations.
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

impl ProviderError {
    pub fn new_with_source_and_context<S, E>(resources: Resources, context: S, source: E) -> Self
    where
        S: Into<String>,
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        Self {
            resources,
            context: Some(context.into()),
            inner: Some(source.into()),
        }
    }

    pub fn new_with_context<S>(resources: Resources, context: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            resources,
            context: Some(context.into()),
            inner: None,
        }
    }

    pub fn resources(&self) -> Resources {
        self.resources
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn inner(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.inner.as_ref().map(|some| some.as_ref())
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.resources())?;
        if let Some(context) = self.context() {
            write!(f, ", {}", context)?;
        }
        if let Some(inner) = self.inner() {
            write!(f, ": {:?}", inner)?;
        }
        Ok(())
    }
}

impl Resources {
    pub fn message(&self) -> &'static str {
        match self {
            Resources::Orphaned => "An error left orphaned resources that cannot be destroyed",
            Resources::Remaining => "An error left resources behind that can be destroyed",
            Resources::Clear => "An error occurred but no resources were left behind",
            Resources::Unknown => {
                "An error occurred and it is unknown whether or not resources were left behind"
            }
        }
    }
}

impl Display for Resources {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self.message(), f)
    }
}

// Make `ProviderError` function as a standard error.
impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// A trait that makes it possible to convert error types to `ProviderError` using a familiar
/// `context` function.
pub trait IntoProviderError<T> {
    /// Convert `self` into a `ProviderError`.
    fn context<S>(self, resources: Resources, message: S) -> ProviderResult<T>
    where
        S: Into<String>;
}

// Implement `IntoProviderError` for all standard `Error + Send + Sync + 'static` types.
impl<T, E> IntoProviderError<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context<S>(self, resources: Resources, message: S) -> ProviderResult<T>
    where
        S: Into<String>,
    {
        self.map_err(|e| ProviderError::new_with_source_and_context(resources, message, e))
    }
}

// Implement `IntoProviderError` for options where `None` is converted into an error.
impl<T> IntoProviderError<T> for std::option::Option<T> {
    fn context<S>(self, r: Resources, m: S) -> Result<T, ProviderError>
    where
        S: Into<String>,
    {
        self.ok_or_else(|| ProviderError::new_with_context(r, m))
    }
}
