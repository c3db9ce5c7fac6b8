use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecompileError {
    #[error("AST Load Error: cannot read {path}: {reason}")]
    AstLoad { path: String, reason: String },

    #[error("AST Parse Error: {0}")]
    AstParse(#[from] serde_json::Error),

    #[error("Inconsistent AST: {reason}")]
    Inconsistent { reason: String },

    #[error("Module verification failed:\n{}", .errors.join("\n"))]
    Verify { errors: Vec<String> },
}
