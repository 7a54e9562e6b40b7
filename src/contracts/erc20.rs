//! ERC-20 bindings for campaign funding tokens

use alloy::sol;

sol! {
    /// Subset of the ERC-20 interface used for campaign funding
    #[sol(rpc)]
    interface IERC20 {
        /// Returns the balance of an account
        function balanceOf(address account) external view returns (uint256);

        /// Returns the allowance of a spender
        function allowance(address owner, address spender) external view returns (uint256);

        /// Approves a spender to spend tokens
        function approve(address spender, uint256 amount) external returns (bool);

        /// Emitted when allowance is set
        event Approval(address indexed owner, address indexed spender, uint256 value);
    }
}
