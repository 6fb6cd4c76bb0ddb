use lgit_lib::git::get_recent_branches;
use lgit_testing::{make_git, GitInitOptions};

#[test]
fn test_recent_branches() -> eyre::Result<()> {
    let git = make_git()?;
    git.init_repo()?;
    git.commit_file("test1", 1)?;

    git.run(&["branch", "feature"])?;
    git.run(&["branch", "doomed"])?;
    git.run(&["checkout", "feature"])?;
    git.run(&["checkout", "master"])?;
    git.run(&["checkout", "doomed"])?;
    git.run(&["checkout", "master"])?;
    git.run(&["branch", "-D", "doomed"])?;
    git.detach_head()?;
    git.run(&["checkout", "master"])?;

    let repo = git.get_repo()?;
    let branches = get_recent_branches(&git.get_git_run_info(), &repo, 100)?;
    let names: Vec<&str> = branches.iter().map(|branch| branch.name.as_str()).collect();
    assert_eq!(names, vec!["master", "feature"]);

    Ok(())
}

#[test]
fn test_recent_branches_respects_limit() -> eyre::Result<()> {
    let git = make_git()?;
    git.init_repo()?;

    git.run(&["branch", "feature"])?;
    git.run(&["checkout", "feature"])?;
    git.run(&["checkout", "master"])?;

    let repo = git.get_repo()?;
    let branches = get_recent_branches(&git.get_git_run_info(), &repo, 1)?;
    let names: Vec<&str> = branches.iter().map(|branch| branch.name.as_str()).collect();
    assert_eq!(names, vec!["master"]);

    Ok(())
}

#[test]
fn test_recent_branches_without_commits() -> eyre::Result<()> {
    let git = make_git()?;
    git.init_repo_with_options(&GitInitOptions {
        make_initial_commit: false,
    })?;

    let repo = git.get_repo()?;
    let branches = get_recent_branches(&git.get_git_run_info(), &repo, 100)?;
    assert!(branches.is_empty());

    Ok(())
}
