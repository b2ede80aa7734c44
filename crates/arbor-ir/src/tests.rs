//! Tests for arbor-ir.

use crate::*;
use std::collections::HashSet;

/// entry -> a -> b -> exit, plus a back edge b -> a and a side exit a -> exit.
fn diamond() -> Bundle {
    let mut builder = BundleBuilder::new("test");
    builder
        .function("main", |code| {
            let entry = code.block("entry")?;
            let a = code.block("a")?;
            let b = code.block("b")?;
            let exit = code.block("exit")?;
            code.statement(entry, "x = 0");
            code.statement(a, "x = x + 1");
            code.statement(exit, "ret x");
            code.edge(entry, a)
                .edge(a, b)
                .edge(b, a)
                .edge(b, exit)
                .edge(a, exit);
            Ok(())
        })
        .unwrap();
    builder
        .function("helper", |code| {
            code.block("only")?;
            Ok(())
        })
        .unwrap();
    builder.build()
}

fn names<'a>(blocks: impl Iterator<Item = &'a BasicBlock>) -> Vec<&'a str> {
    blocks.map(BasicBlock::name).collect()
}

#[test]
fn test_blocks_in_declaration_order() {
    let bundle = diamond();
    let body = bundle.function("main").unwrap().body();
    assert_eq!(names(body.blocks().iter()), ["entry", "a", "b", "exit"]);
    assert_eq!(body.len(), 4);
    assert_eq!(body.entry().unwrap().name(), "entry");
}

#[test]
fn test_lookup_block() {
    let bundle = diamond();
    let body = bundle.function("main").unwrap().body();
    assert_eq!(body.lookup_block("b").unwrap().name(), "b");
    assert_eq!(body.lookup_block("B"), Err(IrError::NotFound("B".into())));
    assert_eq!(body.lookup_block("ex"), Err(IrError::NotFound("ex".into())));
}

#[test]
fn test_successors_and_predecessors() {
    let bundle = diamond();
    let body = bundle.function("main").unwrap().body();
    let a = body.lookup_block("a").unwrap().block_ref();
    let exit = body.lookup_block("exit").unwrap().block_ref();

    let succ: HashSet<_> = names(body.successors(a)).into_iter().collect();
    assert_eq!(succ, HashSet::from(["b", "exit"]));

    let pred: HashSet<_> = names(body.predecessors(a)).into_iter().collect();
    assert_eq!(pred, HashSet::from(["entry", "b"]));

    assert_eq!(body.successors(exit).count(), 0);
    assert_eq!(body.edge_count(), 5);
}

#[test]
fn test_dual_adjacency() {
    let bundle = diamond();
    let body = bundle.function("main").unwrap().body();
    body.check_adjacency().unwrap();
    for a in body.blocks() {
        for b in body.blocks() {
            let forward = body.successors(a.block_ref()).any(|s| s.id() == b.id());
            let backward = body.predecessors(b.block_ref()).any(|p| p.id() == a.id());
            assert_eq!(forward, backward, "{} -> {}", a.name(), b.name());
        }
    }
}

#[test]
fn test_check_adjacency_detects_one_sided_edge() {
    let bundle = diamond();
    let mut body = bundle.function("main").unwrap().body().clone();
    body.succs[3].insert(BlockRef(0));
    assert!(matches!(
        body.check_adjacency(),
        Err(IrError::AdjacencyMismatch { ref block, .. }) if block == "exit"
    ));
}

#[test]
fn test_check_adjacency_detects_dangling_edge() {
    let bundle = diamond();
    let mut body = bundle.function("main").unwrap().body().clone();
    body.succs[0].insert(BlockRef(42));
    assert!(matches!(
        body.check_adjacency(),
        Err(IrError::DanglingEdge { ref from, .. }) if from == "entry"
    ));
}

#[test]
fn test_ids_are_distinct() {
    let bundle = diamond();
    let mut ids = vec![bundle.id()];
    for function in bundle.functions() {
        ids.push(function.id());
        ids.push(function.body().id());
        for block in function.body().blocks() {
            ids.push(block.id());
            ids.extend(block.statements().iter().map(Statement::id));
        }
    }
    let unique: HashSet<_> = ids.iter().copied().collect();
    assert_eq!(unique.len(), ids.len());
}

#[test]
fn test_duplicate_names_rejected() {
    let mut builder = BundleBuilder::new("dup");
    let err = builder
        .function("f", |code| {
            code.block("a")?;
            code.block("a")?;
            Ok(())
        })
        .err();
    assert_eq!(err, Some(IrError::DuplicateBlock("a".into())));

    builder.function("g", |_| Ok(())).unwrap();
    let err = builder.function("g", |_| Ok(())).err();
    assert_eq!(err, Some(IrError::DuplicateFunction("g".into())));
}

#[test]
fn test_edge_by_name() {
    let mut builder = BundleBuilder::new("names");
    let err = builder
        .function("f", |code| {
            code.block("a")?;
            code.block("b")?;
            code.edge_by_name("a", "b")?;
            code.edge_by_name("a", "c")?;
            Ok(())
        })
        .err();
    assert_eq!(
        err,
        Some(IrError::DanglingEdge {
            from: "a".into(),
            to: "c".into()
        })
    );
}

#[test]
fn test_reachable() {
    let mut builder = BundleBuilder::new("reach");
    builder
        .function("f", |code| {
            let a = code.block("a")?;
            let b = code.block("b")?;
            let dead = code.block("dead")?;
            code.edge(a, b).edge(b, a).edge(dead, b);
            Ok(())
        })
        .unwrap();
    let bundle = builder.build();
    let body = bundle.function("f").unwrap().body();
    let reached: Vec<_> = body
        .reachable()
        .into_iter()
        .map(|r| body.block(r).unwrap().name())
        .collect();
    assert_eq!(reached, ["a", "b"]);
}

#[test]
#[should_panic(expected = "entry block of another code body")]
fn test_entry_from_other_body_rejected() {
    let mut builder = BundleBuilder::new("mixed");
    let mut foreign = None;
    builder
        .function("f", |code| {
            code.block("a")?;
            code.block("b")?;
            foreign = Some(code.block("c")?);
            Ok(())
        })
        .unwrap();
    let foreign = foreign.unwrap();
    let _ = builder.function("g", |code| {
        code.block("x")?;
        code.entry(foreign);
        Ok(())
    });
}

#[test]
fn test_reachable_with_dangling_entry_is_empty() {
    let bundle = diamond();
    let mut body = bundle.function("main").unwrap().body().clone();
    body.entry = Some(BlockRef(9));
    assert!(body.entry().is_none());
    assert!(body.reachable().is_empty());
}

#[test]
fn test_function_not_found() {
    let bundle = diamond();
    assert_eq!(
        bundle.function("nope").err(),
        Some(IrError::FunctionNotFound("nope".into()))
    );
}

#[derive(Default)]
struct Recorder {
    interests: NodeKinds,
    seen: Vec<String>,
    fail_on: Option<&'static str>,
}

impl Visitor for Recorder {
    type Error = String;

    fn interests(&self) -> NodeKinds {
        self.interests
    }

    fn visit_bundle(&mut self, bundle: &Bundle) -> Result<(), String> {
        self.seen.push(format!("bundle:{}", bundle.name()));
        Ok(())
    }

    fn visit_function(&mut self, function: &Function) -> Result<(), String> {
        if self.fail_on == Some(function.name()) {
            return Err(format!("failed on {}", function.name()));
        }
        self.seen.push(format!("function:{}", function.name()));
        Ok(())
    }

    fn visit_code(&mut self, code: &Code) -> Result<(), String> {
        self.seen.push(format!("code:{}", code.len()));
        Ok(())
    }

    fn visit_block(&mut self, code: &Code, block: &BasicBlock) -> Result<(), String> {
        let out = code.successors(block.block_ref()).count();
        self.seen.push(format!("block:{}:{}", block.name(), out));
        Ok(())
    }

    fn visit_statement(
        &mut self,
        _block: &BasicBlock,
        statement: &Statement,
    ) -> Result<(), String> {
        self.seen.push(format!("stmt:{}", statement.text()));
        Ok(())
    }
}

#[test]
fn test_walk_functions_only() {
    let bundle = diamond();
    let mut v = Recorder {
        interests: NodeKinds::FUNCTION,
        ..Default::default()
    };
    walk(&bundle, &mut v).unwrap();
    assert_eq!(v.seen, ["function:main", "function:helper"]);
}

#[test]
fn test_walk_no_interests_is_noop() {
    let bundle = diamond();
    let mut v = Recorder::default();
    bundle.accept(&mut v).unwrap();
    assert!(v.seen.is_empty());
}

#[test]
fn test_walk_skips_uninteresting_levels() {
    let bundle = diamond();
    let mut v = Recorder {
        interests: NodeKinds::BUNDLE | NodeKinds::STATEMENT,
        ..Default::default()
    };
    walk(&bundle, &mut v).unwrap();
    assert_eq!(v.seen, ["bundle:test", "stmt:x = 0", "stmt:x = x + 1", "stmt:ret x"]);
}

#[test]
fn test_walk_blocks() {
    let bundle = diamond();
    let mut v = Recorder {
        interests: NodeKinds::CODE | NodeKinds::BASIC_BLOCK,
        ..Default::default()
    };
    walk(&bundle, &mut v).unwrap();
    assert_eq!(
        v.seen,
        [
            "code:4",
            "block:entry:1",
            "block:a:2",
            "block:b:2",
            "block:exit:0",
            "code:1",
            "block:only:0",
        ]
    );
}

#[test]
fn test_walk_stops_at_first_error() {
    let bundle = diamond();
    let mut v = Recorder {
        interests: NodeKinds::all(),
        fail_on: Some("main"),
        ..Default::default()
    };
    let err = walk(&bundle, &mut v).unwrap_err();
    assert_eq!(err, "failed on main");
    assert_eq!(v.seen, ["bundle:test"]);
}

#[test]
fn test_dispatch_by_node_kind() {
    let bundle = diamond();
    let function = bundle.function("helper").unwrap();
    let node = Node::Function(function);
    assert_eq!(node.kind(), NodeKind::Function);
    assert_eq!(node.id(), function.id());

    let mut v = Recorder {
        interests: NodeKinds::BUNDLE,
        ..Default::default()
    };
    dispatch(node, &mut v).unwrap();
    assert!(v.seen.is_empty());

    v.interests = NodeKinds::FUNCTION;
    dispatch(node, &mut v).unwrap();
    assert_eq!(v.seen, ["function:helper"]);
}

#[test]
fn test_walk_single_function() {
    let bundle = diamond();
    let mut v = Recorder {
        interests: NodeKinds::FUNCTION | NodeKinds::CODE,
        ..Default::default()
    };
    walk_function(bundle.function("helper").unwrap(), &mut v).unwrap();
    assert_eq!(v.seen, ["function:helper", "code:1"]);
}
