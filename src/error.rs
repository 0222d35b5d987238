//! Typed errors raised by the runtime itself (as opposed to errors
//! raised from inside template bodies, which travel as
//! `anyhow::Error` unmodified).

use kstring::KString;

/// Define an error type wrapper e.g. `Foo` around a `Box<FooKind>`,
/// so that `Result<T, Foo>` stays one word wide. `Deref` gives access
/// to the kind for matching; `From` forwarding keeps `#[from]` and `?`
/// working.
#[macro_export]
macro_rules! def_boxed_error {
    ($wrappername:ident, $kindname:ident) => {

        #[derive(Debug)]
        pub struct $wrappername(Box<$kindname>);

        impl $wrappername {
            pub fn kind(&self) -> &$kindname {
                &*self.0
            }
        }

        impl std::ops::Deref for $wrappername {
            type Target = $kindname;

            fn deref(&self) -> &Self::Target {
                &*self.0
            }
        }

        impl<E> From<E> for $wrappername where $kindname: From<E> {
            fn from(err: E) -> Self {
                $wrappername(Box::new($kindname::from(err)))
            }
        }

        impl std::error::Error for $wrappername {
            fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
                std::error::Error::source(&*self.0)
            }
        }

        impl std::fmt::Display for $wrappername {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&*self.0, f)
            }
        }
    }
}

/// Defines both an error kind (deriving `thiserror::Error`) and its
/// box wrapper as per `def_boxed_error`.
#[macro_export]
macro_rules! def_boxed_thiserror {
    ($wrappername:ident, $vis:vis enum $kindname:ident {$($body:tt)*}) => {
        #[derive(thiserror::Error, Debug)]
        $vis enum $kindname {
            $($body)*
        }

        $crate::def_boxed_error!($wrappername, $kindname);
    };
}

def_boxed_thiserror!(RenderError, pub enum RenderErrorKind {
    #[error("malformed context JSON: {0}")]
    MalformedContext(#[source] serde_json::Error),

    #[error("expected a JSON object, got: {}", .0.as_str())]
    ContextNotAnObject(KString),

    #[error("malformed globals JSON: {0}")]
    MalformedGlobals(#[source] serde_json::Error),

    #[error("name {:?} is neither in the context nor in the globals", .0.as_str())]
    NameNotFound(KString),

    #[error("no def {:?} bound in scope", .0.as_str())]
    DefNotFound(KString),

    #[error("{0}: no host DOM available")]
    HostCapabilityMissing(&'static str),

    #[error("template {:?} is not defined", .0.as_str())]
    TemplateNotFound(KString),

    #[error("template {:?} is already defined", .0.as_str())]
    DuplicateTemplate(KString),
});

impl RenderError {
    pub fn name_not_found(name: &str) -> Self {
        RenderErrorKind::NameNotFound(KString::from_ref(name)).into()
    }
    pub fn def_not_found(name: &str) -> Self {
        RenderErrorKind::DefNotFound(KString::from_ref(name)).into()
    }
    pub fn template_not_found(id: &str) -> Self {
        RenderErrorKind::TemplateNotFound(KString::from_ref(id)).into()
    }
}
