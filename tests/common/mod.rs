#![allow(dead_code)]

use git2::{Commit, Oid, Repository, RepositoryInitOptions, Signature};
use std::path::Path;

/// Initialise a repository whose first branch is `main`
pub fn init_repo(path: &Path) -> Repository {
    let mut opts = RepositoryInitOptions::new();
    opts.initial_head("main");
    Repository::init_opts(path, &opts).unwrap()
}

/// Commit the current (empty) index on top of HEAD
pub fn commit(repo: &Repository, message: &str) -> Oid {
    let sig = Signature::now("Test", "test@example.com").unwrap();
    let tree_id = repo.index().unwrap().write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();

    let parents: Vec<Commit> = match repo.head() {
        Ok(head) => vec![head.peel_to_commit().unwrap()],
        Err(_) => vec![],
    };
    let parent_refs: Vec<&Commit> = parents.iter().collect();

    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
        .unwrap()
}

pub fn lightweight_tag(repo: &Repository, name: &str, oid: Oid) {
    let object = repo.find_object(oid, None).unwrap();
    repo.tag_lightweight(name, &object, false).unwrap();
}

pub fn annotated_tag(repo: &Repository, name: &str, oid: Oid) {
    let sig = Signature::now("Test", "test@example.com").unwrap();
    let object = repo.find_object(oid, None).unwrap();
    repo.tag(name, &object, &sig, name, false).unwrap();
}

/// Create `branch` at HEAD and check it out
pub fn checkout_new_branch(repo: &Repository, branch: &str) {
    let head = repo.head().unwrap().peel_to_commit().unwrap();
    repo.branch(branch, &head, false).unwrap();
    repo.set_head(&format!("refs/heads/{}", branch)).unwrap();
}
