use lgit_testing::{make_git, GitRunOptions};

#[test]
fn test_not_a_repository() -> eyre::Result<()> {
    let git = make_git()?;

    let (stdout, stderr) = git.lgit_with_options(
        "add",
        &[],
        &GitRunOptions {
            expected_exit_code: 128,
            ..Default::default()
        },
    )?;
    insta::assert_snapshot!(stdout, @"");
    assert!(
        stderr.starts_with("Error: not a Git repository"),
        "stderr was: {stderr}"
    );

    Ok(())
}

#[test]
fn test_working_directory_flag() -> eyre::Result<()> {
    let git = make_git()?;
    git.init_repo()?;
    git.write_file("subdir/test1.txt", "contents\n")?;
    git.run(&["add", "."])?;
    git.run(&["commit", "-m", "add subdir"])?;

    // Global flags go before the subcommand.
    let (stdout, _stderr) = git.lgit("-C", &["subdir", "unstage"])?;
    insta::assert_snapshot!(stdout, @r###"
    Nothing to unstage
    "###);

    Ok(())
}

#[test]
fn test_invalid_reflog_limit_uses_default() -> eyre::Result<()> {
    let git = make_git()?;
    git.init_repo()?;
    git.run(&["config", "lgit.checkoutBranch.reflogLimit", "0"])?;

    let (stdout, _stderr) = git.lgit("checkout-branch", &[])?;
    insta::assert_snapshot!(stdout, @r###"
    No branches to checkout
    "###);

    Ok(())
}
