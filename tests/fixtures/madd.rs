// Code generated by cuda2rs from madd.cu. DO NOT EDIT.
// fingerprint: 0000000000000000000000000000000000000000000000000000000000000000

use std::sync::LazyLock;

use cuda2rs::runtime::{ArgAddr, DevicePtr, Dim3, KernelArgs, KernelContext, LaunchError};

/// Argument cells of kernel `madd`, in parameter order.
#[repr(C)]
#[derive(Default)]
pub struct MaddArgs {
    pub dst: DevicePtr,
    pub a: f32,
    pub n: i32,
}

// SAFETY: one address per field of `*this`, in parameter order.
unsafe impl KernelArgs for MaddArgs {
    unsafe fn addresses(this: *mut Self) -> Vec<ArgAddr> {
        unsafe {
            vec![
                std::ptr::addr_of_mut!((*this).dst).cast(),
                std::ptr::addr_of_mut!((*this).a).cast(),
                std::ptr::addr_of_mut!((*this).n).cast(),
            ]
        }
    }
}

static MADD: LazyLock<KernelContext<MaddArgs>> =
    LazyLock::new(|| KernelContext::new("madd", MADD_PTX));

/// Launch kernel `madd` and wait for it to finish.
///
/// Runs on the kernel's own stream. Concurrent calls are serialized.
pub fn k_madd(
    dst: DevicePtr,
    a: f32,
    n: i32,
    grid_dim: Dim3,
    block_dim: Dim3,
) -> Result<(), LaunchError> {
    MADD.launch(grid_dim, block_dim, MaddArgs { dst, a, n })
}

const MADD_PTX: &str = r#"
.version 8.4
.target sm_52
.address_size 64

	// .globl	madd

.visible .entry madd(
	.param .u64 madd_param_0,
	.param .f32 madd_param_1,
	.param .u32 madd_param_2
)
{
	.reg .pred 	%p<2>;
	.reg .b32 	%r<6>;
	.reg .f32 	%f<4>;
	.reg .b64 	%rd<5>;


	ld.param.u64 	%rd1, [madd_param_0];
	ld.param.f32 	%f1, [madd_param_1];
	ld.param.u32 	%r2, [madd_param_2];
	mov.u32 	%r3, %ctaid.x;
	mov.u32 	%r4, %ntid.x;
	mov.u32 	%r5, %tid.x;
	mad.lo.s32 	%r1, %r3, %r4, %r5;
	setp.ge.s32 	%p1, %r1, %r2;
	@%p1 bra 	$L__BB0_2;

	cvta.to.global.u64 	%rd2, %rd1;
	mul.wide.s32 	%rd3, %r1, 4;
	add.s64 	%rd4, %rd2, %rd3;
	ld.global.f32 	%f2, [%rd4];
	fma.rn.f32 	%f3, %f2, %f1, 0f3F800000;
	st.global.f32 	[%rd4], %f3;

$L__BB0_2:
	ret;

}
"#;
