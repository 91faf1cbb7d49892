// Code generated by cuda2rs from tick.cu. DO NOT EDIT.
// fingerprint: 0000000000000000000000000000000000000000000000000000000000000000

use std::sync::LazyLock;

use cuda2rs::runtime::{ArgAddr, Dim3, KernelArgs, KernelContext, LaunchError};

/// Argument cells of kernel `tick`, in parameter order.
#[repr(C)]
#[derive(Default)]
pub struct TickArgs {}

// SAFETY: one address per field of `*this`, in parameter order.
unsafe impl KernelArgs for TickArgs {
    unsafe fn addresses(_this: *mut Self) -> Vec<ArgAddr> {
        Vec::new()
    }
}

static TICK: LazyLock<KernelContext<TickArgs>> =
    LazyLock::new(|| KernelContext::new("tick", TICK_PTX));

/// Launch kernel `tick` and wait for it to finish.
///
/// Runs on the kernel's own stream. Concurrent calls are serialized.
pub fn k_tick(grid_dim: Dim3, block_dim: Dim3) -> Result<(), LaunchError> {
    TICK.launch(grid_dim, block_dim, TickArgs {})
}

const TICK_PTX: &str = r#"
.version 8.4
.target sm_52
.address_size 64

.global .align 4 .u32 ticks;

.visible .entry tick()
{
	.reg .pred 	%p<2>;
	.reg .b32 	%r<3>;
	.reg .b64 	%rd<2>;


	mov.u32 	%r1, %tid.x;
	setp.ne.s32 	%p1, %r1, 0;
	@%p1 bra 	$L__BB0_2;

	mov.u64 	%rd1, ticks;
	atom.global.add.u32 	%r2, [%rd1], 1;

$L__BB0_2:
	ret;

}
"#;
