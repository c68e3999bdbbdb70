/// Log an error together with its whole source chain.
#[macro_export]
macro_rules! tracing_report {
    ($error:expr) => {
        tracing::error!(err = %snafu::Report::from_error(&$error));
    };
    ($error:expr, $message:expr) => {
        tracing::error!(err = %snafu::Report::from_error(&$error), "{}", $message);
    };
}
