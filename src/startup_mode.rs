use crate::DEV_MODE_FLAG;

/// Where the backend sources come from: the local checkout or the bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StartupMode {
    Development,
    Packaged,
}

impl StartupMode {
    pub(crate) fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if args
            .into_iter()
            .skip(1)
            .any(|arg| arg.as_ref().trim() == DEV_MODE_FLAG)
        {
            Self::Development
        } else {
            Self::Packaged
        }
    }

    pub(crate) fn is_development(self) -> bool {
        self == Self::Development
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Packaged => "packaged",
        }
    }
}
