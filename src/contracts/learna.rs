//! Learna campaign contract bindings

use alloy::sol;

sol! {
    /// Learna learn-to-earn campaign contract
    #[sol(rpc)]
    interface ILearna {
        /// Create a campaign, optionally funded with an ERC-20 and/or native CELO
        function setUpCampaign(
            bytes32 campaignHash,
            address fundsErc20,
            uint256 fundAmount
        ) external payable;

        /// Mint a pass key so the user may record quiz points in a campaign
        function generateKey(address user, bytes32 campaignHash) external payable;

        /// Record quiz points for a user; admin only
        function recordPoints(
            address user,
            uint32 points,
            bytes32 campaignHash
        ) external;

        /// Claim the user's share of a closed week's rewards
        function claimReward(
            address user,
            uint256 weekId,
            bytes32 campaignHash
        ) external;

        /// Close the current week and sort its reward pool; admin only
        function sortWeeklyReward(
            uint256 growthTokenAmount,
            uint256 minimumToken
        ) external;

        /// Tip the platform in native CELO
        function tip() external payable;

        /// Current week counter
        function getWeekId() external view returns (uint256);

        /// Whether the user already holds a pass key for the campaign
        function hasPassKey(address user, bytes32 campaignHash) external view returns (bool);

        event PointsRecorded(address indexed user, bytes32 indexed campaignHash, uint32 points);

        event WeeklyRewardSorted(uint256 indexed weekId, uint256 growthTokenAmount);
    }
}
