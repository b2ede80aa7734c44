//! Built-in regression check for the CFG of a function with LLVM phi
//! transitions.
//!
//! Three sequential counted loops; every phi transition and every branch on
//! a comparison gets its own block (`*in_..._phi`, `*out_..._icmp_true`,
//! `*out_..._icmp_false`), giving 33 blocks and 36 edges.

use crate::pass::CfgTransPass;
use rhizome_arbor_pass_abi::Pass;

pub const LLVM_PHI_2: &str = "unittest-cfg-trans-llvm-phi-2";

pub const LLVM_PHI_2_BLOCKS: usize = 33;

/// Atoms carry a `$` sigil and lines end in `\` continuations.
pub const LLVM_PHI_2_EDGES: &str = r"($trans\
  ($edge ($*in_entry_to_for.cond_phi) ($for.cond))\
  ($edge ($*in_for.body.3_to_for.cond.4_phi) ($for.cond.4))\
  ($edge ($*in_for.body_to_for.cond.1_phi) ($for.cond.1))\
  ($edge ($*in_for.end.24_to_for.cond.25_phi) ($for.cond.25))\
  ($edge ($*in_for.inc.19_to_for.cond.1_phi) ($for.cond.1))\
  ($edge ($*in_for.inc.22_to_for.cond_phi) ($for.cond))\
  ($edge ($*in_for.inc.35_to_for.cond.25_phi) ($for.cond.25))\
  ($edge ($*in_for.inc_to_for.cond.4_phi) ($for.cond.4))\
  ($edge ($*out_for.cond.1_to_for.body.3_icmp_true) ($for.body.3))\
  ($edge ($*out_for.cond.1_to_for.end.21_icmp_false) ($for.end.21))\
  ($edge ($*out_for.cond.25_to_for.body.27_icmp_true) ($for.body.27))\
  ($edge ($*out_for.cond.25_to_for.end.37_icmp_false) ($for.end.37))\
  ($edge ($*out_for.cond.4_to_for.body.6_icmp_true) ($for.body.6))\
  ($edge ($*out_for.cond.4_to_for.end_icmp_false) ($for.end))\
  ($edge ($*out_for.cond_to_for.body_icmp_true) ($for.body))\
  ($edge ($*out_for.cond_to_for.end.24_icmp_false) ($for.end.24))\
  ($edge ($entry) ($*in_entry_to_for.cond_phi))\
  ($edge ($for.body) ($*in_for.body_to_for.cond.1_phi))\
  ($edge ($for.body.27) ($for.inc.35))\
  ($edge ($for.body.3) ($*in_for.body.3_to_for.cond.4_phi))\
  ($edge ($for.body.6) ($for.inc))\
  ($edge ($for.cond) ($*out_for.cond_to_for.body_icmp_true))\
  ($edge ($for.cond) ($*out_for.cond_to_for.end.24_icmp_false))\
  ($edge ($for.cond.1) ($*out_for.cond.1_to_for.body.3_icmp_true))\
  ($edge ($for.cond.1) ($*out_for.cond.1_to_for.end.21_icmp_false))\
  ($edge ($for.cond.25) ($*out_for.cond.25_to_for.body.27_icmp_true))\
  ($edge ($for.cond.25) ($*out_for.cond.25_to_for.end.37_icmp_false))\
  ($edge ($for.cond.4) ($*out_for.cond.4_to_for.body.6_icmp_true))\
  ($edge ($for.cond.4) ($*out_for.cond.4_to_for.end_icmp_false))\
  ($edge ($for.end) ($for.inc.19))\
  ($edge ($for.end.21) ($for.inc.22))\
  ($edge ($for.end.24) ($*in_for.end.24_to_for.cond.25_phi))\
  ($edge ($for.inc) ($*in_for.inc_to_for.cond.4_phi))\
  ($edge ($for.inc.19) ($*in_for.inc.19_to_for.cond.1_phi))\
  ($edge ($for.inc.22) ($*in_for.inc.22_to_for.cond_phi))\
  ($edge ($for.inc.35) ($*in_for.inc.35_to_for.cond.25_phi))\
  )";

pub fn llvm_phi_2() -> CfgTransPass {
    CfgTransPass::new(
        LLVM_PHI_2,
        format!("Verifier pass for {LLVM_PHI_2}"),
        LLVM_PHI_2_EDGES,
    )
    .with_banner("This pass verifies regression test parsing/call-args")
    .with_block_count(LLVM_PHI_2_BLOCKS)
    .with_sigil('$')
}

/// Registry constructor for [`llvm_phi_2`].
pub fn llvm_phi_2_factory() -> Box<dyn Pass> {
    Box::new(llvm_phi_2())
}
