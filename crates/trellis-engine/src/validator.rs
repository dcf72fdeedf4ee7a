use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use trellis_core::{
    ErrorReport, ErrorReporter, IrNode, MessagesProvider, MetadataValidator, RefsStore,
    SimpleErrorReporter, SimpleMessagesProvider,
};
use trellis_schema::{CompileOptions, SchemaNode};

use crate::errors::ValidateError;
use crate::exec::Executor;

/// Compiled schema: the IR tree plus the refs store it references.
///
/// Immutable once built; safely shared read-only across unboundedly many
/// concurrent validations.
#[derive(Debug)]
pub struct Program {
    pub ir: IrNode,
    pub refs: RefsStore,
}

/// Compile a schema node tree into a reusable validator.
///
/// Compile once per schema and keep the validator around; every
/// `validate` call against it is independent.
pub fn compile(schema: &SchemaNode, options: &CompileOptions) -> Validator {
    let mut refs = RefsStore::new();
    let ir = schema.compile_to_ir(&mut refs, options);
    debug!(refs = refs.len(), "schema compiled");
    Validator::new(Program { ir, refs })
}

type ReporterFactory = dyn Fn() -> Box<dyn ErrorReporter> + Send + Sync;

/// Per-call options.
#[derive(Debug, Default, Clone)]
pub struct ValidateOptions {
    /// Metadata shared with every rule through the field context and
    /// checked by the bound metadata validator, when any.
    pub meta: Option<Value>,
}

impl ValidateOptions {
    pub fn with_meta(meta: Value) -> Self {
        Self { meta: Some(meta) }
    }
}

/// Binds a compiled program to runtime options and executes it.
#[derive(Clone)]
pub struct Validator {
    program: Arc<Program>,
    messages: Arc<dyn MessagesProvider>,
    reporter_factory: Arc<ReporterFactory>,
    metadata_validator: Option<Arc<dyn MetadataValidator>>,
    convert_empty_strings_to_null: bool,
}

impl Validator {
    pub fn new(program: Program) -> Self {
        Self {
            program: Arc::new(program),
            messages: Arc::new(SimpleMessagesProvider::new()),
            reporter_factory: Arc::new(|| Box::new(SimpleErrorReporter::new())),
            metadata_validator: None,
            convert_empty_strings_to_null: false,
        }
    }

    /// Replace the messages provider consulted at report time.
    pub fn with_messages_provider(mut self, messages: Arc<dyn MessagesProvider>) -> Self {
        self.messages = messages;
        self
    }

    /// Replace the reporter constructed for each call.
    pub fn with_reporter_factory<F, R>(mut self, factory: F) -> Self
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: ErrorReporter + 'static,
    {
        self.reporter_factory = Arc::new(move || Box::new(factory()));
        self
    }

    /// Validate caller metadata before any field processing.
    pub fn with_metadata_validator(mut self, validator: Arc<dyn MetadataValidator>) -> Self {
        self.metadata_validator = Some(validator);
        self
    }

    /// Normalize empty-string leaf inputs to null before rule dispatch.
    pub fn convert_empty_strings_to_null(mut self, convert: bool) -> Self {
        self.convert_empty_strings_to_null = convert;
        self
    }

    /// The compiled program this validator executes.
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Validate `input`, resolving with the narrowed/transformed output
    /// or rejecting with the aggregated error report.
    pub async fn validate(
        &self,
        input: Value,
        options: ValidateOptions,
    ) -> Result<Value, ValidateError> {
        let mut reporter = (self.reporter_factory)();
        let meta = options.meta.unwrap_or(Value::Null);

        if let Some(failed) = self.check_metadata(&meta, reporter.as_mut()) {
            return Err(failed);
        }

        let executor = Executor::new(
            &self.program.refs,
            self.messages.as_ref(),
            self.convert_empty_strings_to_null,
            &input,
            &meta,
        );
        let output = executor.execute(&self.program.ir, reporter.as_mut()).await?;
        self.finish(reporter, output)
    }

    /// Synchronous variant of [`Validator::validate`].
    ///
    /// Fails with a contract error (not a reported validation error) as
    /// soon as any rule or predicate marked async is reached.
    pub fn validate_sync(
        &self,
        input: Value,
        options: ValidateOptions,
    ) -> Result<Value, ValidateError> {
        let mut reporter = (self.reporter_factory)();
        let meta = options.meta.unwrap_or(Value::Null);

        if let Some(failed) = self.check_metadata(&meta, reporter.as_mut()) {
            return Err(failed);
        }

        let executor = Executor::new(
            &self.program.refs,
            self.messages.as_ref(),
            self.convert_empty_strings_to_null,
            &input,
            &meta,
        );
        let output = executor.execute_sync(&self.program.ir, reporter.as_mut())?;
        self.finish(reporter, output)
    }

    /// Validate and deserialize the output into a concrete type.
    pub async fn validate_as<T: DeserializeOwned>(
        &self,
        input: Value,
        options: ValidateOptions,
    ) -> Result<T, ValidateError> {
        let output = self.validate(input, options).await?;
        Ok(serde_json::from_value(output)?)
    }

    /// Synchronous variant of [`Validator::validate_as`].
    pub fn validate_sync_as<T: DeserializeOwned>(
        &self,
        input: Value,
        options: ValidateOptions,
    ) -> Result<T, ValidateError> {
        let output = self.validate_sync(input, options)?;
        Ok(serde_json::from_value(output)?)
    }

    fn check_metadata(
        &self,
        meta: &Value,
        reporter: &mut dyn ErrorReporter,
    ) -> Option<ValidateError> {
        let validator = self.metadata_validator.as_ref()?;
        match validator.validate(meta) {
            Ok(()) => None,
            Err(errors) => {
                for error in errors {
                    reporter.report(error);
                }
                debug!("metadata validation failed");
                Some(ValidateError::Failed(ErrorReport::new(
                    reporter.take_errors(),
                )))
            }
        }
    }

    fn finish(
        &self,
        mut reporter: Box<dyn ErrorReporter>,
        output: Option<Value>,
    ) -> Result<Value, ValidateError> {
        if reporter.has_errors() {
            let report = ErrorReport::new(reporter.take_errors());
            debug!(errors = report.errors.len(), "validation failed");
            return Err(ValidateError::Failed(report));
        }
        debug!("validation passed");
        Ok(output.unwrap_or(Value::Null))
    }
}
