use vergen_gitcl::{Emitter, GitclBuilder};

fn main() -> anyhow::Result<()> {
    // Outside of a git checkout vergen emits placeholder values
    let git = GitclBuilder::default()
        .sha(true)
        .branch(true)
        .commit_date(true)
        .build()?;

    Emitter::default().add_instructions(&git)?.emit()?;

    Ok(())
}
